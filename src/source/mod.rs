pub mod http;
pub mod replay;

pub use http::HttpCardSource;
pub use replay::FileCardSource;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::RawCard;

/// Whatever renders the signal page and hands back its cards.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Acquire the session. Failure here is fatal for the run.
    async fn open(&mut self) -> Result<()>;
    /// Cards in page order.
    async fn fetch_cards(&mut self) -> Result<Vec<RawCard>>;
    /// Release the session. Called on every exit path.
    async fn close(&mut self);
    fn describe(&self) -> String;
}
