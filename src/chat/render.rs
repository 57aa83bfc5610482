use pulldown_cmark::Event;

use crate::{
    include_res,
    model::{Message, User},
};

/// Which side of the chat box a message sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Sent,
    Received,
}

impl Placement {
    pub fn of(message: &Message, user: &User) -> Self {
        if message.owner == user.username {
            Placement::Sent
        } else {
            Placement::Received
        }
    }

    fn container_class(self) -> &'static str {
        match self {
            Placement::Sent => "sent-container",
            Placement::Received => "received-container",
        }
    }

    fn bubble_class(self) -> &'static str {
        match self {
            Placement::Sent => "sent",
            Placement::Received => "received",
        }
    }
}

/// Renders one message row. Without a user nothing about the message is
/// shown, only a loading placeholder.
pub fn render_message(message: &Message, user: Option<&User>) -> String {
    let Some(user) = user else {
        return include_res!(str, "/pages/loading.html").to_owned();
    };
    let placement = Placement::of(message, user);

    include_res!(str, "/pages/message.html")
        .replace("{container_class}", placement.container_class())
        .replace("{bubble_class}", placement.bubble_class())
        .replace("{owner}", &escape(&message.owner))
        .replace("{body}", &escape(&message.message))
}

/// Renders messages in the order given.
pub fn render_chatbox(messages: &[Message], user: Option<&User>) -> String {
    messages
        .iter()
        .map(|message| render_message(message, user))
        .collect()
}

/// Escapes user text as an HTML text node.
pub(crate) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    pulldown_cmark::html::push_html(&mut out, std::iter::once(Event::Text(text.into())));
    // keeps user text from matching template placeholders
    out.replace('{', "&#123;").replace('}', "&#125;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(id: &str, owner: &str, body: &str) -> Message {
        Message {
            id: id.to_owned(),
            owner: owner.to_owned(),
            message: body.to_owned(),
            created_at: "2024-01-01T00:00:00Z".to_owned(),
        }
    }

    #[test]
    fn own_messages_are_sent() {
        let alice = User::new("alice");
        assert_eq!(Placement::of(&msg("1", "alice", "hi"), &alice), Placement::Sent);
        assert_eq!(Placement::of(&msg("2", "bob", "hey"), &alice), Placement::Received);
    }

    #[test]
    fn renders_owner_and_body_for_both_sides() {
        let alice = User::new("alice");
        let sent = render_message(&msg("1", "alice", "hi"), Some(&alice));
        assert!(sent.contains(r#"class="sent-container""#));
        assert!(sent.contains(">alice<"));
        assert!(sent.contains("<p>hi</p>"));

        let received = render_message(&msg("2", "bob", "hey"), Some(&alice));
        assert!(received.contains(r#"class="received-container""#));
        assert!(received.contains(">bob<"));
        assert!(received.contains("<p>hey</p>"));
    }

    #[test]
    fn absent_user_renders_only_placeholders() {
        assert_eq!(render_chatbox(&[], None), "");

        let many: Vec<_> = (0..25).map(|i| msg(&i.to_string(), "bob", "secret")).collect();
        let html = render_chatbox(&many, None);
        assert_eq!(html.matches("Loading...").count(), 25);
        assert!(!html.contains("secret"));
        assert!(!html.contains("bob"));
    }

    #[test]
    fn rendering_is_idempotent() {
        let alice = User::new("alice");
        let message = msg("1", "bob", "hey");
        assert_eq!(render_message(&message, Some(&alice)), render_message(&message, Some(&alice)));
    }

    #[test]
    fn text_is_escaped() {
        let alice = User::new("alice");
        let html = render_message(&msg("1", "<b>x</b>", "{owner} & <script>"), Some(&alice));
        assert!(html.contains("&lt;b&gt;x&lt;/b&gt;"));
        assert!(html.contains("&#123;owner&#125; &amp; &lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn markdown_syntax_stays_literal() {
        assert_eq!(escape("**bold** _x_ # h"), "**bold** _x_ # h");
        assert_eq!(escape("a\nb"), "a\nb");
    }
}
