//! Static content page route handlers.
//!
//! Support contacts and brand stories. The copy is compiled in; nothing
//! here talks to the backend.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;
use tower_sessions::Session;
use tracing::instrument;

use crate::filters;
use crate::models::PageContext;

/// A support desk with its contact details.
#[derive(Debug)]
pub struct SupportChannel {
    pub title: &'static str,
    pub description: &'static str,
    pub email: &'static str,
    pub phone: &'static str,
}

impl SupportChannel {
    /// `tel:` link target with formatting characters removed.
    #[must_use]
    pub fn phone_href(&self) -> String {
        let digits: String = self
            .phone
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '+')
            .collect();
        format!("tel:{digits}")
    }
}

pub const SUPPORT_CHANNELS: &[SupportChannel] = &[
    SupportChannel {
        title: "Orders & Shipping",
        description: "Track your order or get help with shipping-related questions",
        email: "orders@arcverse.com",
        phone: "+1 (555) 123-4567",
    },
    SupportChannel {
        title: "Technical Support",
        description: "Get help with product setup, troubleshooting, and repairs",
        email: "support@arcverse.com",
        phone: "+1 (555) 234-5678",
    },
    SupportChannel {
        title: "Returns & Refunds",
        description: "Process returns or get information about refunds",
        email: "returns@arcverse.com",
        phone: "+1 (555) 345-6789",
    },
    SupportChannel {
        title: "General Inquiries",
        description: "For all other questions and assistance",
        email: "info@arcverse.com",
        phone: "+1 (555) 456-7890",
    },
];

/// A story teaser.
#[derive(Debug)]
pub struct Story {
    pub category: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub date: &'static str,
    pub read_time: &'static str,
}

pub const STORIES: &[Story] = &[
    Story {
        category: "Innovation",
        title: "The Birth of ARC Vision Pro",
        description: "How we revolutionized mixed reality with our most ambitious project yet",
        date: "May 2025",
        read_time: "5 min read",
    },
    Story {
        category: "Design Story",
        title: "Crafting the Perfect Sound",
        description: "The journey behind our award-winning ARC Headphones Pro",
        date: "April 2025",
        read_time: "4 min read",
    },
    Story {
        category: "Customer Story",
        title: "Gaming Without Limits",
        description: "How professional gamers are using ARC devices to transform their experience",
        date: "March 2025",
        read_time: "3 min read",
    },
];

/// A customer quote.
#[derive(Debug)]
pub struct Testimonial {
    pub name: &'static str,
    pub role: &'static str,
    pub company: &'static str,
    pub quote: &'static str,
}

pub const TESTIMONIALS: &[Testimonial] = &[
    Testimonial {
        name: "Sarah Chen",
        role: "Creative Director",
        company: "Design Studios Co.",
        quote: "ARC products have completely transformed how we approach creative work.",
    },
    Testimonial {
        name: "James Rodriguez",
        role: "Professional Gamer",
        company: "Team Epsilon",
        quote: "The response time and clarity of ARC displays give us a competitive edge.",
    },
    Testimonial {
        name: "Dr. Emily Watson",
        role: "Research Lead",
        company: "Future Tech Institute",
        quote: "The precision and reliability of ARC devices make them invaluable in our research.",
    },
];

/// Support page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/support.html")]
pub struct SupportTemplate {
    pub page: PageContext,
    pub channels: &'static [SupportChannel],
}

/// Stories page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/stories.html")]
pub struct StoriesTemplate {
    pub page: PageContext,
    pub stories: &'static [Story],
    pub testimonials: &'static [Testimonial],
}

/// Display the support page.
#[instrument(skip(session))]
pub async fn support(session: Session) -> impl IntoResponse {
    SupportTemplate {
        page: PageContext::load(&session).await,
        channels: SUPPORT_CHANNELS,
    }
}

/// Display the stories page.
#[instrument(skip(session))]
pub async fn stories(session: Session) -> impl IntoResponse {
    StoriesTemplate {
        page: PageContext::load(&session).await,
        stories: STORIES,
        testimonials: TESTIMONIALS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_href() {
        assert_eq!(SUPPORT_CHANNELS[0].phone_href(), "tel:+15551234567");
    }
}
