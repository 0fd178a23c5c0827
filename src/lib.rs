pub mod core {
    pub mod config;
    pub mod error;
    pub mod tracing_init;
}

pub mod models {
    pub mod status;
    pub mod user;
}

pub mod api {
    pub mod client;
    pub mod gateway;
}

pub mod view {
    pub mod collate;
    pub mod derive;
    pub mod spec;
}

pub mod session {
    pub mod controller;
    pub mod focus;
    pub mod search;
    pub mod state;
}

pub mod handlers {
    pub mod command;
    pub mod render;
}
