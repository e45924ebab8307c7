pub mod ball;
pub mod pockets;
pub mod registry;
pub mod rules;
pub mod session;
pub mod settle;
