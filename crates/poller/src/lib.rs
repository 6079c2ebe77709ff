pub mod api;
pub mod formatter;
pub mod poll_loop;
pub mod validator;
