use crate::{
    config::{ContentConfig, Link},
    view::Element,
};

pub fn hero(content: &ContentConfig) -> Element {
    Element::new("header")
        .class("hero")
        .attr("id", "home")
        .child(Element::new("div").attr("id", "scene-container"))
        .child(
            Element::new("div")
                .class("hero-content")
                .child(
                    Element::new("h1")
                        .class("display-1")
                        .child(Element::text(&content.artist)),
                )
                .child(
                    Element::new("p")
                        .class("lead")
                        .child(Element::text(&content.tagline)),
                ),
        )
}

pub fn video_showcase(content: &ContentConfig) -> Element {
    section("video", "Latest Video").child(
        Element::new("div").class("ratio ratio-16x9").child(
            Element::new("iframe")
                .attr("src", content.video_embed_url.clone())
                .attr("title", format!("{} video", content.artist))
                .attr("allow", "autoplay; encrypted-media; picture-in-picture")
                .attr("allowfullscreen", "true"),
        ),
    )
}

pub fn music(content: &ContentConfig) -> Element {
    section("music", "Music")
        .child(
            Element::new("iframe")
                .class("music-embed")
                .attr("src", content.music_embed_url.clone())
                .attr("height", "352")
                .attr("allow", "encrypted-media")
                .attr("loading", "lazy"),
        )
        .child(link_list("music-links", &content.music_links))
}

pub fn visuals(content: &ContentConfig) -> Element {
    section("visuals", "Visuals").child(link_list("visual-links", &content.visuals))
}

pub fn footer(content: &ContentConfig) -> Element {
    Element::new("footer")
        .class("footer")
        .child(link_list("social-links", &content.socials))
        .child(Element::new("p").class("copyright").child(Element::text(format!(
            "© {} {}",
            content.copyright_year, content.artist
        ))))
}

/// All sections in page order.
pub fn sections(content: &ContentConfig) -> Vec<Element> {
    vec![
        hero(content),
        video_showcase(content),
        music(content),
        visuals(content),
        footer(content),
    ]
}

fn section(id: &'static str, title: &str) -> Element {
    Element::new("section")
        .class("content-section")
        .attr("id", id)
        .child(Element::new("h2").child(Element::text(title)))
}

fn link_list(class: &'static str, links: &[Link]) -> Element {
    Element::new("ul").class(class).children(links.iter().map(|link| {
        Element::new("li").child(
            Element::new("a")
                .attr("href", link.href.clone())
                .attr("target", "_blank")
                .attr("rel", "noopener noreferrer")
                .child(Element::text(&link.label)),
        )
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sections_render_in_fixed_order() {
        let tags: Vec<_> = sections(&ContentConfig::default())
            .iter()
            .map(|section| (section.tag(), section.get_attr("id").map(str::to_string)))
            .collect();
        assert_eq!(
            tags,
            vec![
                (Some("header"), Some("home".to_string())),
                (Some("section"), Some("video".to_string())),
                (Some("section"), Some("music".to_string())),
                (Some("section"), Some("visuals".to_string())),
                (Some("footer"), None),
            ]
        );
    }

    #[test]
    fn embeds_point_at_configured_urls() {
        let content = ContentConfig::default();
        let section = music(&content);
        let frames = section.find_all(&|e: &Element| e.tag() == Some("iframe"));
        assert_eq!(frames[0].get_attr("src"), Some(content.music_embed_url.as_str()));

        let video = video_showcase(&content);
        let frames = video.find_all(&|e: &Element| e.tag() == Some("iframe"));
        assert_eq!(frames[0].get_attr("src"), Some(content.video_embed_url.as_str()));
    }

    #[test]
    fn footer_lists_every_social_link() {
        let content = ContentConfig::default();
        let anchors = footer(&content).find_all(&|e: &Element| e.tag() == Some("a")).len();
        assert_eq!(anchors, content.socials.len());
    }
}
