//! Core HTTP/1.x protocol types.
//!
//! # Architecture
//!
//! - **Message Handling** ([`message`]): payload items and body framing
//!   - [`Message`]: either a response head or a payload chunk
//!   - [`PayloadItem`]: a body chunk or EOF
//!   - [`Framing`]: how the request body is delimited
//!   - [`ReadStatus`]: whether a body read finished the body
//!
//! - **Request Processing** ([`request`]): [`RequestHead`], [`HeaderList`], [`TargetForm`]
//!
//! - **Response Processing** ([`response`]): [`ResponseHead`] and [`Disposition`]
//!
//! - **Phases** ([`phase`]): [`ReadPhase`] and [`WritePhase`]
//!
//! - **Error Handling** ([`error`]):
//!   - [`HttpError`]: Top-level error type
//!   - [`ParseError`]: Request parsing errors, each with the status to report
//!   - [`SendError`]: Response sending errors

mod message;
pub use message::Framing;
pub use message::Message;
pub use message::PayloadItem;
pub use message::ReadStatus;

mod request;
pub use request::HeaderList;
pub use request::RequestHead;
pub use request::TargetForm;

mod response;
pub use response::Disposition;
pub use response::ResponseHead;

mod phase;
pub use phase::ReadPhase;
pub use phase::WritePhase;

mod error;
pub use error::HttpError;
pub use error::LineKind;
pub use error::ParseError;
pub use error::SendError;
