mod app;
mod audio;
mod catalog;
mod config;
mod runtime;
mod ui;

fn main() -> anyhow::Result<()> {
    runtime::run()
}
