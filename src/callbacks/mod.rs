//! Callback module - typed callback exports and their dispatch.
//!
//! Plugins export callbacks under a `(namespace, name)` pair, the same way a
//! scripting host exports functions. Placeholders are then bound to an
//! exported callback by that identity, and the signature is checked when the
//! placeholder is registered instead of when it is first evaluated.
//!
//! ## Usage
//!
//! ```rust
//! use placeholder_engine::callbacks::{CallbackRef, CallbackTable, PlaceholderCallback};
//!
//! let table = CallbackTable::new();
//! table.export(
//!     CallbackRef::new("JSPH", "serverTime"),
//!     PlaceholderCallback::server(|_token, _param| Ok("12:00".to_string())),
//! );
//! ```

mod dispatch;
mod table;

pub use dispatch::CallbackDispatcher;
pub use table::{CallbackRef, CallbackResult, CallbackTable, PlaceholderCallback, Signature};
