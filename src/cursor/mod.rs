//! Cursor module
//!
//! Opaque continuation tokens for cursor pagination.
//!
//! # Overview
//!
//! A token is URL-safe base64 (no padding) over the JSON form of a
//! `PaginationCursor`. Tokens are self-contained and carry no version; a token
//! minted by one build is not guaranteed to decode in another.

mod codec;

pub use codec::{CursorCodec, PaginationCursor};
