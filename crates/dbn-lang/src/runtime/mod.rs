pub mod canvas;
pub mod environment;
pub mod frames;
pub mod interpreter;
pub mod value;
