use dioxus::prelude::*;

use crate::explain::ExplainView;

#[component]
pub fn Home() -> Element {
    rsx! {
        section { class: "page page-home",
            header { class: "page-home__header",
                h1 { {crate::t!("app-title")} }
                p { {crate::t!("app-tagline")} }
            }
            ExplainView {}
        }
    }
}
