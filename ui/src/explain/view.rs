use std::cell::RefCell;
use std::rc::Rc;

use dioxus::prelude::*;
use futures_channel::mpsc::UnboundedSender;
use futures_util::StreamExt;

use crate::core::config::ServiceConfig;
use crate::core::remote::{DetectionClient, ExplanationClient, ExplanationRequest, RemoteError};
use crate::core::{catalog, platform, timing};
use crate::t;

use super::engine::{Effect, ExplainEngine, ExplanationResult, DEBOUNCE_MS, MAX_AGE, MIN_AGE};

type SenderSlot = Rc<RefCell<Option<UnboundedSender<ExplainIntent>>>>;

#[derive(Debug, Clone)]
enum ExplainIntent {
    TextChanged(String),
    AgeChanged(u8),
    LanguageChanged(String),
    SelectorToggled,
    DebounceElapsed {
        generation: u64,
    },
    DetectionResolved {
        generation: u64,
        code: String,
    },
    ExplanationResolved {
        generation: u64,
        outcome: Result<String, RemoteError>,
    },
}

#[component]
pub fn ExplainView() -> Element {
    let engine = use_signal(ExplainEngine::new);
    let detection = use_hook(|| DetectionClient::new(ServiceConfig::default()));
    let explanation = use_hook(|| ExplanationClient::new(ServiceConfig::default()));

    let sender_slot: SenderSlot = Rc::new(RefCell::new(None));
    let sender_slot_for_loop = sender_slot.clone();

    let coroutine = {
        let engine_ref = engine.clone();
        let detection = detection.clone();
        let explanation = explanation.clone();

        use_coroutine(move |mut rx: UnboundedReceiver<ExplainIntent>| {
            let sender_slot = sender_slot_for_loop.clone();
            let mut engine_signal = engine_ref.clone();
            let detection = detection.clone();
            let explanation = explanation.clone();

            async move {
                // At most one debounce timer is alive; each keystroke
                // cancels and replaces it.
                let mut debounce: Option<Task> = None;

                while let Some(intent) = rx.next().await {
                    let effect = engine_signal.with_mut(|eng| match intent {
                        ExplainIntent::TextChanged(text) => eng.text_changed(text),
                        ExplainIntent::AgeChanged(age) => eng.age_changed(age),
                        ExplainIntent::LanguageChanged(code) => eng.language_changed(code),
                        ExplainIntent::SelectorToggled => eng.selector_toggled(),
                        ExplainIntent::DebounceElapsed { generation } => {
                            eng.debounce_elapsed(generation)
                        }
                        ExplainIntent::DetectionResolved { generation, code } => {
                            eng.detection_resolved(generation, &code)
                        }
                        ExplainIntent::ExplanationResolved {
                            generation,
                            outcome,
                        } => eng.explanation_resolved(generation, outcome),
                    });

                    match effect {
                        Effect::None => {}
                        Effect::ArmDebounce { generation } => {
                            if let Some(stale) = debounce.take() {
                                stale.cancel();
                            }
                            debounce = Some(queue_debounce(sender_slot.clone(), generation));
                        }
                        Effect::Detect { generation, text } => {
                            queue_detection(&sender_slot, detection.clone(), generation, text);
                        }
                        Effect::Explain {
                            generation,
                            request,
                        } => {
                            queue_explanation(
                                &sender_slot,
                                explanation.clone(),
                                generation,
                                request,
                            );
                        }
                    }
                }
            }
        })
    };

    sender_slot.borrow_mut().replace(coroutine.tx());

    let send = {
        let coroutine = coroutine.clone();
        move |intent: ExplainIntent| {
            coroutine.send(intent);
        }
    };

    let snapshot = engine();

    let output = if snapshot.is_loading() {
        rsx! {
            div { class: "explainer__spinner", aria_label: t!("loading-label"),
                span { class: "explainer__spinner-disc" }
            }
        }
    } else {
        match &snapshot.result {
            ExplanationResult::Success { text } => rsx! {
                p { class: "explainer__result", "{text}" }
            },
            ExplanationResult::Failure { message } => rsx! {
                p { class: "explainer__result explainer__result--failure", "{message}" }
            },
            _ => rsx! {
                p { class: "explainer__placeholder", {t!("empty-hint")} }
            },
        }
    };

    rsx! {
        article { class: "explainer",
            div { class: "explainer__input",
                textarea {
                    class: "explainer__textarea",
                    placeholder: t!("input-placeholder"),
                    value: "{snapshot.raw_text}",
                    oninput: move |evt| send(ExplainIntent::TextChanged(evt.value())),
                }
            }

            div { class: "explainer__output",
                {output}
            }

            footer { class: "explainer__controls",
                div { class: "explainer__selector",
                    button {
                        r#type: "button",
                        class: "explainer__selector-toggle",
                        onclick: move |_| send(ExplainIntent::SelectorToggled),
                        "{catalog::display_name(&snapshot.selected)}"
                    }

                    if snapshot.selector_open {
                        div { class: "explainer__selector-panel",
                            button {
                                r#type: "button",
                                class: "explainer__language explainer__language--auto",
                                class: if snapshot.selected == catalog::AUTO { "explainer__language--active" },
                                onclick: move |_| {
                                    send(ExplainIntent::LanguageChanged(catalog::AUTO.to_string()))
                                },
                                "{catalog::display_name(catalog::AUTO)}"
                            }
                            div { class: "explainer__language-grid",
                                for (code, name) in catalog::entries().filter(|(code, _)| *code != catalog::AUTO) {
                                    button {
                                        key: "{code}",
                                        r#type: "button",
                                        class: "explainer__language",
                                        class: if snapshot.selected == code { "explainer__language--active" },
                                        onclick: move |_| {
                                            send(ExplainIntent::LanguageChanged(code.to_string()))
                                        },
                                        "{name}"
                                    }
                                }
                            }
                        }
                    }
                }

                select {
                    class: "explainer__age",
                    value: "{snapshot.age}",
                    onchange: move |evt| {
                        if let Ok(age) = evt.value().parse::<u8>() {
                            send(ExplainIntent::AgeChanged(age));
                        }
                    },
                    for age in MIN_AGE..=MAX_AGE {
                        option {
                            value: "{age}",
                            selected: snapshot.age == age,
                            {t!("age-option", age = age)}
                        }
                    }
                }
            }

            if snapshot.selected == catalog::AUTO {
                p { class: "explainer__detected",
                    {t!("detected-label", language = catalog::display_name(&snapshot.detected))}
                }
            }
        }
    }
}

fn queue_debounce(sender_slot: SenderSlot, generation: u64) -> Task {
    spawn(async move {
        timing::sleep_ms(DEBOUNCE_MS).await;
        let sender = sender_slot.borrow().as_ref().cloned();
        if let Some(sender) = sender {
            let _ = sender.unbounded_send(ExplainIntent::DebounceElapsed { generation });
        }
    })
}

fn queue_detection(
    sender_slot: &SenderSlot,
    client: DetectionClient,
    generation: u64,
    text: String,
) {
    if let Some(sender) = sender_slot.borrow().as_ref().cloned() {
        platform::spawn_future(async move {
            let code = client.detect(&text).await;
            let _ = sender.unbounded_send(ExplainIntent::DetectionResolved { generation, code });
        });
    }
}

fn queue_explanation(
    sender_slot: &SenderSlot,
    client: ExplanationClient,
    generation: u64,
    request: ExplanationRequest,
) {
    if let Some(sender) = sender_slot.borrow().as_ref().cloned() {
        platform::spawn_future(async move {
            let outcome = client.explain(&request).await;
            let _ = sender.unbounded_send(ExplainIntent::ExplanationResolved {
                generation,
                outcome,
            });
        });
    }
}
