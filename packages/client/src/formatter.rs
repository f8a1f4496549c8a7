//! Message formatting utilities for client display.

use atrium_server::infrastructure::dto::websocket::{MessageDto, PresenceDto, UserDto};
use atrium_shared::time::{timestamp_to_clock_time, timestamp_to_rfc3339};

use crate::reconcile::{ClientMessageView, PresenceRoster};

const RULE: &str = "============================================================";

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Greeting shown once the server has admitted the connection
    pub fn format_session_ready(user: &UserDto, online: &[PresenceDto]) -> String {
        let mut output = String::new();
        output.push_str(&format!("\n\n{}\n", RULE));
        let role = if user.is_admin { " [admin]" } else { "" };
        output.push_str(&format!(
            "Signed in as {} (#{}){}\n",
            user.display_name, user.user_id, role
        ));
        output.push_str("Online:\n");
        if online.is_empty() {
            output.push_str("(nobody)\n");
        }
        for entry in online {
            let me_suffix = if entry.user_id == user.user_id { " (me)" } else { "" };
            output.push_str(&format!(
                "  #{} {}{} - online since {}\n",
                entry.user_id,
                entry.display_name,
                me_suffix,
                timestamp_to_rfc3339(entry.online_since)
            ));
        }
        output.push_str(&format!("{}\n", RULE));
        output
    }

    pub fn format_message_created(message: &MessageDto) -> String {
        format!("\n{}\n", Self::format_message_line(message))
    }

    pub fn format_message_updated(message: &MessageDto) -> String {
        format!(
            "\n~ [{}] #{} edited by @{}: {}\n",
            timestamp_to_clock_time(message.updated_at),
            message.id,
            message.author_name,
            message.content
        )
    }

    pub fn format_message_deleted(message: &MessageDto) -> String {
        format!("\n x #{} by @{} was deleted\n", message.id, message.author_name)
    }

    pub fn format_presence_online(display_name: &str, at: i64) -> String {
        format!("\n+ {} is online ({})\n", display_name, timestamp_to_clock_time(at))
    }

    pub fn format_presence_offline(display_name: &str, at: i64) -> String {
        format!("\n- {} went offline ({})\n", display_name, timestamp_to_clock_time(at))
    }

    /// Typing line for the current active set, or `None` when nobody is typing
    pub fn format_typing(active: &[(i64, String)]) -> Option<String> {
        match active {
            [] => None,
            [(_, name)] => Some(format!("\n... {} is typing\n", name)),
            names => {
                let names: Vec<&str> = names.iter().map(|(_, name)| name.as_str()).collect();
                Some(format!("\n... {} are typing\n", names.join(", ")))
            }
        }
    }

    pub fn format_private_message(from: &str, body: &str, sent_at: i64) -> String {
        format!(
            "\n[private] @{} ({}): {}\n",
            from,
            timestamp_to_clock_time(sent_at),
            body
        )
    }

    pub fn format_ack(client_ref: Option<&str>, received_at: i64) -> String {
        match client_ref {
            Some(client_ref) => format!(
                "delivered {} at {}\n",
                client_ref,
                timestamp_to_rfc3339(received_at)
            ),
            None => format!("delivered at {}\n", timestamp_to_rfc3339(received_at)),
        }
    }

    /// `/who` output
    pub fn format_roster(roster: &PresenceRoster, me: Option<i64>) -> String {
        if roster.is_empty() {
            return "(nobody online)\n".to_string();
        }
        let mut output = String::new();
        for (user_id, name) in roster.users() {
            let me_suffix = if Some(user_id) == me { " (me)" } else { "" };
            output.push_str(&format!("  #{} {}{}\n", user_id, name, me_suffix));
        }
        output
    }

    /// `/history` output
    pub fn format_history(view: &ClientMessageView) -> String {
        if view.is_empty() {
            return "(no messages)\n".to_string();
        }
        let mut output = String::new();
        for message in view.iter() {
            output.push_str(&Self::format_message_line(message));
            output.push('\n');
        }
        output
    }

    fn format_message_line(message: &MessageDto) -> String {
        let edited = if message.edited { " (edited)" } else { "" };
        format!(
            "[{}] #{} @{}: {}{}",
            timestamp_to_clock_time(message.created_at),
            message.id,
            message.author_name,
            message.content,
            edited
        )
    }

    pub fn format_raw_message(text: &str) -> String {
        format!("\n{}\n", text)
    }

    pub fn format_error(error: &dyn std::fmt::Display) -> String {
        format!("! {}\n", error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(id: i64, content: &str, edited: bool) -> MessageDto {
        MessageDto {
            id,
            author_id: 1,
            author_name: "alice".to_string(),
            content: content.to_string(),
            // 1970-01-01T00:00:01Z
            created_at: 1_000,
            updated_at: if edited { 2_000 } else { 1_000 },
            edited,
        }
    }

    #[test]
    fn test_format_message_created() {
        // テスト項目: 新規メッセージが時刻・id・投稿者付きで表示される
        // given (前提条件):
        let message = message(7, "hello", false);

        // when (操作):
        let result = MessageFormatter::format_message_created(&message);

        // then (期待する結果):
        assert_eq!(result, "\n[00:00:01] #7 @alice: hello\n");
    }

    #[test]
    fn test_format_history_marks_edits() {
        // テスト項目: 履歴表示で編集済みのメッセージに印が付く
        // given (前提条件):
        let mut view = ClientMessageView::new();
        view.apply_created(message(1, "first", false));
        view.apply_created(message(2, "second", true));

        // when (操作):
        let result = MessageFormatter::format_history(&view);

        // then (期待する結果):
        assert_eq!(
            result,
            "[00:00:01] #1 @alice: first\n[00:00:01] #2 @alice: second (edited)\n"
        );
    }

    #[test]
    fn test_format_typing() {
        // テスト項目: 入力中のユーザー数に応じて表示が変わる
        // given (前提条件):
        let nobody: Vec<(i64, String)> = vec![];
        let one = vec![(2, "bob".to_string())];
        let two = vec![(2, "bob".to_string()), (3, "carol".to_string())];

        // when (操作):
        let nobody = MessageFormatter::format_typing(&nobody);
        let one = MessageFormatter::format_typing(&one);
        let two = MessageFormatter::format_typing(&two);

        // then (期待する結果):
        assert_eq!(nobody, None);
        assert_eq!(one, Some("\n... bob is typing\n".to_string()));
        assert_eq!(two, Some("\n... bob, carol are typing\n".to_string()));
    }

    #[test]
    fn test_format_roster_marks_me() {
        // テスト項目: /who の表示で自分に (me) が付く
        // given (前提条件):
        let mut roster = PresenceRoster::new();
        roster.set_online(1, "alice");
        roster.set_online(2, "bob");

        // when (操作):
        let result = MessageFormatter::format_roster(&roster, Some(1));

        // then (期待する結果):
        assert_eq!(result, "  #1 alice (me)\n  #2 bob\n");
    }

    #[test]
    fn test_format_session_ready_with_empty_roster() {
        // テスト項目: 誰もオンラインでない場合の表示
        // given (前提条件):
        let user = UserDto {
            user_id: 9,
            display_name: "root".to_string(),
            is_admin: true,
        };

        // when (操作):
        let result = MessageFormatter::format_session_ready(&user, &[]);

        // then (期待する結果):
        assert!(result.contains("Signed in as root (#9) [admin]\n"));
        assert!(result.contains("(nobody)\n"));
    }
}
