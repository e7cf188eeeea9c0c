use gemini_samples::dispatch::Collector;
use gemini_samples::v1beta::response::GroundingMetadata;

/// Loads `.env`, defaults `RUST_LOG` to `info` and installs the fmt subscriber.
pub fn init() {
    dotenv::dotenv().ok();

    if std::env::var("RUST_LOG").is_err() {
        unsafe {
            std::env::set_var("RUST_LOG", "info");
        }
    }
    tracing_subscriber::fmt::init();
}

/// Model name from `var`, or `default` when unset.
#[allow(dead_code)]
pub fn model(var: &str, default: &str) -> String {
    std::env::var(var).unwrap_or_else(|_| default.to_string())
}

#[allow(dead_code)]
pub fn print_collected(collector: &Collector) {
    for text in &collector.texts {
        println!("{text}");
    }
    for path in &collector.saved {
        println!("saved {}", path.display());
    }
    if let Some(grounding) = &collector.grounding {
        print_grounding(grounding);
    }
}

#[allow(dead_code)]
pub fn print_grounding(grounding: &GroundingMetadata) {
    if !grounding.web_search_queries.is_empty() {
        println!("search queries: {}", grounding.web_search_queries.join(", "));
    }
    for (n, chunk) in grounding.grounding_chunks.iter().enumerate() {
        if let Some(source) = chunk.source() {
            println!(
                "[{n}] {} {}",
                source.title.as_deref().unwrap_or("untitled"),
                source.uri.as_deref().unwrap_or_default()
            );
        }
    }
    if let Some(token) = &grounding.google_maps_widget_context_token {
        println!("maps widget token: {token}");
    }
}
