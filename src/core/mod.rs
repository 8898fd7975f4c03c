pub mod assembler;
pub mod assets;
pub mod builder;
pub mod cache;
pub mod config;
pub mod fallback;
pub mod grid;
pub mod nav;
pub mod palette;
pub mod pipeline;
pub mod projection;
pub mod shape;
pub mod validator;
