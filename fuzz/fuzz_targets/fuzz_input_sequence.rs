#![no_main]

use std::sync::Arc;

use confession::config::WidgetConfig;
use confession::controller::{Controller, InputEvent};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let config = WidgetConfig {
        seed: Some(0),
        ..WidgetConfig::default()
    };
    let mut controller = Controller::new(Arc::new(config));

    for chunk in data.chunks(3) {
        let input = match chunk[0] % 6 {
            0 => InputEvent::PointerEnterAuthoritative,
            1 => InputEvent::TouchStartAuthoritative,
            2 => InputEvent::ClickButton { id: "main".into() },
            3 => InputEvent::ClickButton {
                id: format!("decoy-{}", chunk.get(1).copied().unwrap_or(0) % 8).as_str().into(),
            },
            4 => InputEvent::ClickAffirmative,
            _ => InputEvent::Resize {
                width: f64::from(chunk.get(1).copied().unwrap_or(0)) * 10.0,
                height: f64::from(chunk.get(2).copied().unwrap_or(0)) * 10.0,
            },
        };
        let outcome = controller.handle(&input);
        for pending in &outcome.clears {
            controller.expire(pending);
        }
        let state = controller.snapshot();
        assert!(state.buttons.iter().filter(|b| b.button.is_authoritative).count() <= 1);
    }
});
