use crate::message::{Media, MediaKind, Message};

pub(crate) fn text_msg(id: i64, date: &str, text: &str) -> Message {
    Message {
        id,
        date: date.to_string(),
        text: Some(text.to_string()),
        media: None,
        is_reply: false,
        is_forward: false,
        sender_id: None,
        views: None,
        forwards: None,
        reactions: Vec::new(),
    }
}

pub(crate) fn media_msg(id: i64, date: &str, kind: MediaKind) -> Message {
    Message {
        text: None,
        media: Some(Media {
            kind,
            mime_type: None,
            file_size: None,
        }),
        ..text_msg(id, date, "")
    }
}

pub(crate) fn from_sender(mut message: Message, sender: i64) -> Message {
    message.sender_id = Some(sender);
    message
}
