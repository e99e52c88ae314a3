//! Site header with background video, logo and navigation.

use dioxus::prelude::*;

/// Path of the muted looping header video.
pub const HEADER_VIDEO: &str = "/video1.mp4";

/// Path of the site logo.
pub const LOGO: &str = "/logo1.png";

/// Props for the [`SiteHeader`] component.
#[derive(Props, Clone, PartialEq)]
pub struct SiteHeaderProps {
    /// Route of the background remover view.
    remover_route: NavigationTarget,
    /// Route of the media resizer view.
    resizer_route: NavigationTarget,
}

/// Header shown above every view.
#[component]
pub fn SiteHeader(props: SiteHeaderProps) -> Element {
    rsx! {
        header { class: "site-header",
            video {
                class: "site-header-video",
                autoplay: true,
                muted: true,
                r#loop: true,
                source { src: HEADER_VIDEO, r#type: "video/mp4" }
                "Your browser does not support the video tag."
            }
            div { class: "site-header-bar",
                div { class: "brand",
                    img { class: "brand-logo", src: LOGO, alt: "Logo" }
                    h1 { class: "brand-title", "PixiQuad" }
                }
                nav { class: "site-nav",
                    Link { to: props.remover_route, "Background Remover" }
                    Link { to: props.resizer_route, "Media Resizer" }
                }
            }
        }
    }
}
