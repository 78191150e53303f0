//! External collaborators: the Coinone exchange API, news sources, and the
//! chat-completion generation endpoint.

pub mod coinone_client;
pub mod llm_client;
pub mod news_fetcher;
pub mod signing;
