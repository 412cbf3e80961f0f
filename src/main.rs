use bus::HostEvent;
use dom::Document;
use html::dom_utils::outline_from_dom;
use html_test_support::ChatPage;
use prompt_index::chrome::{SEARCH_ID, SIDEBAR_ID};
use prompt_index::{Config, PageRuntime};
use std::process::ExitCode;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

const CONFIG_ENV: &str = "PROMPT_INDEX_CONFIG";
const OUTLINE_CAP: usize = 200;

fn load_config() -> Result<Config, prompt_index::ConfigError> {
    match std::env::var_os(CONFIG_ENV) {
        Some(path) => {
            log::info!("loading config from {}", path.to_string_lossy());
            Config::load(path)
        }
        None => Ok(Config::default()),
    }
}

fn send(rt: &mut PageRuntime, event: HostEvent) {
    if rt.sender().send(event).is_err() {
        log::error!("page bus closed");
    }
    rt.pump();
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match load_config() {
        Ok(config) => config,
        Err(err) => {
            log::error!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let doc = match Document::new("https://chatgpt.com/c/demo-thread") {
        Ok(doc) => doc,
        Err(err) => {
            log::error!("cannot create document: {err}");
            return ExitCode::FAILURE;
        }
    };
    let mut rt = PageRuntime::new(doc, config);
    let mut page = ChatPage::new();

    // The host starts rendering before the page is ready.
    page.scaffold();
    page.user_message("How do I read a TOML file into a struct?");
    send(&mut rt, page.commit());
    rt.start();
    send(&mut rt, HostEvent::DomContentLoaded);
    log::info!("document is {:?}", rt.document().ready_state());

    page.assistant_message("Use serde with the toml crate.");
    let streaming = page.empty_message();
    send(&mut rt, page.commit());
    page.append_text(streaming.body, "And how do I report parse errors nicely?");
    send(&mut rt, page.commit());
    rt.advance(500);

    page.user_message("Can the panel survive a re-render?");
    send(&mut rt, page.commit());

    if let Some(panel) = rt.document().get_element_by_id(SIDEBAR_ID) {
        match rt.document_mut().remove(panel) {
            Ok(()) => log::info!("host removed the panel"),
            Err(err) => log::warn!("could not remove the panel: {err}"),
        }
    }
    rt.advance(rt.core().config().reconcile_interval_ms);

    if let Some(input) = rt.document().get_element_by_id(SEARCH_ID) {
        send(
            &mut rt,
            HostEvent::Input {
                target: input,
                value: "how".to_string(),
            },
        );
    }

    for entry in rt.core().entries() {
        log::info!("#{} {}", entry.sequence, entry.text);
    }
    for entry in rt.core().project("how") {
        log::info!("matches \"how\": #{}", entry.sequence);
    }
    log::info!("panel is {:?}", rt.core().visibility());

    if let Some(snapshot) = rt
        .document()
        .get_element_by_id(SIDEBAR_ID)
        .and_then(|panel| rt.document().snapshot_of(panel))
    {
        for line in outline_from_dom(&snapshot, OUTLINE_CAP) {
            println!("{line}");
        }
    }
    ExitCode::SUCCESS
}
