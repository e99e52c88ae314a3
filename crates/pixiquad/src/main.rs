use dioxus::logger::tracing;
use dioxus::prelude::*;
use pixiquad_io::{ImageBackgroundRemover, MediaResizer, RemovalClient, SiteHeader};
use pixiquad_media::RemoverConfig;

/// Background removal endpoint baked in at build time.
///
/// Defaults to a `pixiquad-proxy` running locally with its default
/// settings. Set `PIXIQUAD_REMOVE_BG_URL` when the proxy lives elsewhere,
/// e.g. `/api/removebg` when it is served from the app's own origin.
const REMOVE_BG_URL: Option<&str> = option_env!("PIXIQUAD_REMOVE_BG_URL");

fn main() {
    dioxus::launch(app);
}

#[derive(Debug, Clone, PartialEq, Routable)]
#[rustfmt::skip]
enum Route {
    #[layout(Shell)]
        #[redirect("/", || Route::Resizer {})]
        #[route("/media-resizer")]
        Resizer {},
        #[route("/image-background-remover")]
        Remover {},
}

/// Root application component.
fn app() -> Element {
    rsx! {
        style { dangerous_inner_html: include_str!("../assets/main.css") }
        Router::<Route> {}
    }
}

/// Header plus the active view.
#[component]
fn Shell() -> Element {
    rsx! {
        div { class: "app",
            SiteHeader {
                remover_route: Route::Remover {}.into(),
                resizer_route: Route::Resizer {}.into(),
            }
            main { class: "content",
                Outlet::<Route> {}
            }
        }
    }
}

#[component]
fn Resizer() -> Element {
    rsx! {
        MediaResizer {}
    }
}

#[component]
fn Remover() -> Element {
    let client = use_hook(|| {
        let config = REMOVE_BG_URL.map_or_else(RemoverConfig::default, RemoverConfig::with_endpoint);
        tracing::info!(endpoint = %config.endpoint, "background removal endpoint");
        RemovalClient::new(config)
    });
    rsx! {
        ImageBackgroundRemover { client }
    }
}
