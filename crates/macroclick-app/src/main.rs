//! MacroClick application entry point (headless).
//!
//! Wires the capture/injection backends to the application layer and runs
//! until Ctrl-C. The four global hotkeys drive everything: F1 record,
//! F2 play, Esc stop, F3 spam-click by default (rebindable via the config
//! file).
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load AppConfig          -- playback defaults, hotkey labels
//!  └─ AppController::new()    -- recorder / player / spam / hotkeys
//!  └─ start services
//!       ├─ hotkey listener    (capture feed + drain thread)
//!       ├─ action loop        (Tokio task, applies hotkey actions)
//!       └─ notification pump  (Tokio task, logs observer notifications)
//! ```

use tracing::info;
use tracing_subscriber::EnvFilter;

use macroclick_app::infrastructure::storage::config::{self, AppConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Config first so its log level can seed the filter; RUST_LOG wins.
    let app_config = config::load_config().unwrap_or_else(|e| {
        eprintln!("warning: could not load config, using defaults: {e}");
        AppConfig::default()
    });

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(app_config.general.log_level.clone())),
        )
        .init();

    info!("MacroClick starting");
    run(app_config).await
}

#[cfg(not(feature = "os-input"))]
async fn run(_app_config: AppConfig) -> anyhow::Result<()> {
    tracing::error!(
        "built without the `os-input` feature; rebuild with `--features os-input` \
         to capture and inject real input"
    );
    Ok(())
}

#[cfg(feature = "os-input")]
async fn run(app_config: AppConfig) -> anyhow::Result<()> {
    use std::sync::Arc;
    use std::time::Duration;

    use macroclick_app::application::{AppController, Notifier};
    use macroclick_app::infrastructure::input_capture::rdev_backend::RdevInputSource;
    use macroclick_app::infrastructure::input_capture::InputSource;
    use macroclick_app::infrastructure::input_injection::enigo_backend::EnigoInjector;
    use macroclick_app::infrastructure::input_injection::InputInjector;
    use macroclick_core::HotkeySlot;

    let injector = Arc::new(EnigoInjector::new().map_err(|e| anyhow::anyhow!("{e}"))?);
    let recorder_source = Arc::new(RdevInputSource::new());
    let hotkey_source = Arc::new(RdevInputSource::new());

    let (notifier, notifications) = Notifier::channel();
    let (controller, actions) = AppController::new(
        recorder_source as Arc<dyn InputSource>,
        hotkey_source as Arc<dyn InputSource>,
        injector as Arc<dyn InputInjector>,
        notifier,
    );

    // Apply persisted settings.
    controller.set_playback_config(app_config.playback.to_playback_config());
    controller.apply_hotkey_labels(&app_config.hotkeys);

    // ── Notification pump ─────────────────────────────────────────────────────
    tokio::spawn(log_notifications(notifications));

    // ── Hotkey action loop ────────────────────────────────────────────────────
    tokio::spawn(Arc::clone(&controller).run(actions));

    if !controller.start_hotkey_listener() {
        anyhow::bail!("failed to start the hotkey listener");
    }

    let bindings = controller.bindings();
    info!(
        record = %bindings.get(HotkeySlot::Record).label(),
        play = %bindings.get(HotkeySlot::Play).label(),
        stop = %bindings.get(HotkeySlot::Stop).label(),
        spam = %bindings.get(HotkeySlot::Spam).label(),
        "MacroClick ready. Press Ctrl-C to exit."
    );

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");

    controller.force_stop();
    controller.stop_hotkey_listener();
    tokio::time::sleep(Duration::from_millis(100)).await;

    info!("MacroClick stopped");
    Ok(())
}

/// Logs observer notifications; a UI would render these instead.
#[cfg(feature = "os-input")]
async fn log_notifications(
    mut notifications: macroclick_app::application::NotificationReceiver,
) {
    use macroclick_app::application::notifications::{Notification, StatusLevel};

    while let Some(notification) = notifications.recv().await {
        match notification {
            Notification::Status { text, level } => match level {
                StatusLevel::Error => tracing::error!("{text}"),
                StatusLevel::Warning => tracing::warn!("{text}"),
                StatusLevel::Info | StatusLevel::Success => info!("{text}"),
            },
            Notification::EventLogged { line } => info!("{line}"),
            Notification::LiveInput { text, .. } => tracing::debug!(input = %text, "live input"),
            Notification::CountdownTick { remaining_secs } => {
                tracing::debug!(remaining_secs, "loop delay countdown")
            }
            Notification::PlaybackFinished => info!("playback finished"),
            Notification::HotkeyCaptured { slot, label } => {
                info!(slot = slot.as_str(), key = %label, "hotkey captured")
            }
        }
    }
}
