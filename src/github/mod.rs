pub mod client;
pub mod link;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{GitHubClient, PageFlow, PAGE_SIZE};
pub use transport::{ApiResponse, HttpTransport, Transport};
