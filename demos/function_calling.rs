//! Function calling: the model asks for `getWeather`, the local result is sent back.

use gemini_samples::driver::Driver;
use gemini_samples::v1beta::request::{FunctionDeclaration, Request, Tool};
use gemini_samples::v1beta::{
    Content, FunctionResponse, FunctionResult, Part, PartData, Role,
};
use serde_json::json;
use tracing::info;

#[path = "common/utils.rs"]
mod utils;

fn get_weather(location: &str) -> serde_json::Value {
    match location {
        "New York" => json!({"temp": 65, "condition": "Sunny"}),
        "London" => json!({"temp": 50, "condition": "Rainy"}),
        _ => json!({"temp": "unknown", "condition": "unknown"}),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    utils::init();

    let driver = Driver::from_env()?;
    let client = driver.client(&utils::model("GEMINI_MODEL", "gemini-1.5-flash"));

    let tools = vec![Tool::FunctionDeclarations(vec![
        FunctionDeclaration::new(
            "getWeather",
            "Get the current weather for a specified location",
        )
        .with_parameters(json!({
            "type": "object",
            "properties": {
                "location": {
                    "type": "string",
                    "description": "The city or location to get the weather for"
                }
            },
            "required": ["location"]
        })),
    ])];

    let prompt = Content::user_text("What's the weather like in New York today?");
    let response = client
        .generate_content(Request::new(vec![prompt.clone()]).with_tools(tools.clone()))
        .await?;

    let Some(call) = response.function_calls().find(|c| c.name == "getWeather").cloned() else {
        println!("{}", response.text().unwrap_or_default());
        return Ok(());
    };

    let location = call.args["location"].as_str().unwrap_or_default().to_string();
    info!(%location, "model requested weather");

    let reply = FunctionResponse::new(
        call.id.clone(),
        call.name.clone(),
        FunctionResult::new(get_weather(&location)),
    );
    let contents = vec![
        prompt,
        Content::new(Role::Model, vec![Part::new(PartData::FunctionCall(call))]),
        Content::new(Role::User, vec![Part::new(PartData::FunctionResponse(reply))]),
    ];

    let response = client
        .generate_content(Request::new(contents).with_tools(tools))
        .await?;
    println!("{}", response.text().unwrap_or_default());
    Ok(())
}
