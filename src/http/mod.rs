//! HTTP request dispatching for test cases

mod dispatcher;
mod payload;
mod response;

pub use dispatcher::{Dispatch, Dispatcher};
pub use payload::{form_body, FormBody, Payload, PayloadKind};
pub use response::{ResponseBody, ResponseRecord};
