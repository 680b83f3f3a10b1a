//! Scripted playback session against the simulated player
//!
//! Renders every observed change as one line, the moral equivalent of
//! the property labels in a playback details panel. The script loads an
//! item, lets it stall and recover under automatic waiting, swaps the
//! item mid-session, disables automatic waiting via the persisted
//! preference, and tears the observer down.

use std::sync::Arc;
use std::time::Duration;

use autowait_observer::PlaybackObserver;
use autowait_player::{
    MemorySettings, SettingsProvider, SimulatedItem, SimulatedPlayer, TimeRange,
    DISABLE_AUTO_WAIT_KEY,
};
use autowait_state::logging;

async fn pause_for(millis: u64) {
    tokio::time::sleep(Duration::from_millis(millis)).await;
}

/// Advance the item's clock in poll-visible steps
async fn play_through(item: &SimulatedItem, steps: u32) {
    for _ in 0..steps {
        item.advance_time(0.1);
        pause_for(100).await;
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_logging_from_env()?;

    // The single persisted preference lives behind an injected provider.
    let settings = MemorySettings::new();
    let auto_wait = !settings.bool_for(DISABLE_AUTO_WAIT_KEY).unwrap_or(false);

    let player = Arc::new(SimulatedPlayer::new());
    player.set_automatically_waits(auto_wait);

    let observer = PlaybackObserver::new(|attribute, observed, _snapshot| {
        println!("{:<26} {}", attribute.key(), observed);
    });

    println!("-- loading first item --");
    let first = Arc::new(SimulatedItem::new());
    player.replace_current_item(Some(first.clone()));
    observer.set_target(player.clone(), Some(first.clone()))?;
    pause_for(50).await;

    println!("-- play (buffer not ready, player waits) --");
    player.play();
    pause_for(200).await;

    println!("-- buffer fills --");
    first.set_loaded_time_ranges(vec![TimeRange::new(0.0, 2.5)]);
    first.set_buffer_empty(false);
    pause_for(100).await;

    println!("-- buffer likely to keep up, playback starts --");
    first.set_likely_to_keep_up(true);
    player.reevaluate_waiting();
    first.set_timebase_rate(1.0);
    play_through(&first, 4).await;

    println!("-- swapping to second item --");
    let second = Arc::new(SimulatedItem::new());
    player.replace_current_item(Some(second.clone()));
    observer.set_item(Some(second.clone()))?;
    pause_for(100).await;

    println!("-- disable automatic waiting and play immediately --");
    settings.set_bool(DISABLE_AUTO_WAIT_KEY, true);
    player.set_automatically_waits(false);
    player.play_immediately(1.0);
    second.set_timebase_rate(1.0);
    play_through(&second, 3).await;

    println!("-- pause and tear down --");
    player.pause();
    pause_for(100).await;
    observer.teardown().await;

    println!("-- final snapshot --");
    for (attribute, observed) in observer.snapshot().iter() {
        println!("{:<26} {}", attribute.key(), observed);
    }

    Ok(())
}
