//! Client-side navigation layer for the VCS browsing service.
//!
//! Holds the provider → repository → branch → path → preview selection as an
//! explicit state machine, talks to the proxy surface through the
//! [`VcsGateway`] seam and hands picked files to a [`QueryFileSink`] consumer.

pub mod files;
pub mod gateway;
pub mod navigator;
pub mod state;

pub use files::{QueryFile, QueryFileSink, RAW_INLINE_DATA};
pub use gateway::{GatewayError, HttpVcsGateway, VcsGateway};
pub use navigator::Navigator;
pub use state::{NavigationState, Preview};
