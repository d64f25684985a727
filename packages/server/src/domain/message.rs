//! メッセージ文法と整形
//!
//! 受信した 1 行を履歴要求・ダイレクトメッセージ・ブロードキャストのいずれかに分類し、
//! クライアントへ配送する文字列を整形します。整形結果はクライアントとの公開契約です。

use std::fmt;

use super::Username;

/// 履歴再送を要求するコマンド
pub const HISTORY_COMMAND: &str = "/history";

/// ダイレクトメッセージの接頭辞
pub const DIRECT_MESSAGE_MARKER: char = '@';

/// 受信メッセージの分類結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundMessage<'a> {
    /// `/history`
    HistoryRequest,
    /// `@<recipient> <body>`
    Direct { recipient: &'a str, body: &'a str },
    /// `@` で始まるが宛先または本文が欠けている
    MalformedDirect,
    /// それ以外のテキスト
    Broadcast(&'a str),
}

impl<'a> InboundMessage<'a> {
    /// 1 行を分類する
    ///
    /// 宛先は `@` の後の最初の空白区切りトークン、本文はその後の空白を飛ばした残り全体。
    pub fn parse(raw: &'a str) -> Self {
        if raw == HISTORY_COMMAND {
            return Self::HistoryRequest;
        }

        let Some(rest) = raw.strip_prefix(DIRECT_MESSAGE_MARKER) else {
            return Self::Broadcast(raw);
        };

        let rest = rest.trim_start();
        let Some((recipient, body)) = rest.split_once(char::is_whitespace) else {
            return Self::MalformedDirect;
        };
        let body = body.trim_start();
        if recipient.is_empty() || body.is_empty() {
            return Self::MalformedDirect;
        }

        Self::Direct { recipient, body }
    }
}

/// クライアントへ配送される整形済みメッセージ
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice<'a> {
    Joined(&'a Username),
    Left(&'a Username),
    Broadcast { from: &'a Username, body: &'a str },
    Direct { from: &'a Username, body: &'a str },
    UnknownRecipient(&'a str),
    MalformedDirect,
}

impl fmt::Display for Notice<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Joined(username) => write!(f, "{} has joined the chat.", username),
            Notice::Left(username) => write!(f, "{} has left the chat.", username),
            Notice::Broadcast { from, body } => write!(f, "[{}]: {}", from, body),
            Notice::Direct { from, body } => write!(f, "[DM from {}]: {}", from, body),
            Notice::UnknownRecipient(recipient) => write!(
                f,
                "Could not deliver direct message: unknown user '{}'.",
                recipient
            ),
            Notice::MalformedDirect => write!(
                f,
                "Could not deliver direct message: expected '@<user> <message>'."
            ),
        }
    }
}
