pub mod security_ctx;
