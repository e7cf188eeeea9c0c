//! Typed client and driver for the Gemini **v1beta** APIs.
//!
//! [`v1beta::rest::Client`] covers the HTTP endpoints: content generation,
//! token counting, embeddings, long-running video generation, the Files API
//! and file download. [`v1beta::live::Client`] speaks the websocket Live API, and
//! [`v1beta::session`] wraps it in a scoped one-turn exchange.
//! [`driver::Driver`] strings these together the way the demo programs use
//! them: build a request, call, route each response part, persist media.
//!
//! ## Example
//!
//! ```no_run
//! use gemini_samples::config::Config;
//! use gemini_samples::driver::{Driver, Grounding, Options, Prompt};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let driver = Driver::new(Config::from_env()?);
//! let response = driver
//!     .generate(
//!         "gemini-2.0-flash",
//!         Prompt::new("When is the next total solar eclipse in the United States?"),
//!         Options::new().with_grounding(Grounding::Search),
//!     )
//!     .await?;
//! println!("{}", response.text().unwrap_or_default());
//! # Ok(())
//! # }
//! ```
//!
//! See the `demos` directory for one program per flow.

pub mod config;
pub mod dispatch;
pub mod driver;
pub mod v1beta;
