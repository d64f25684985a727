//! UseCase 層
//!
//! Repository と MessagePusher を組み合わせて、接続・切断・メッセージ配送・参照系の
//! ユースケースを実装します。

mod connect_participant;
mod disconnect_participant;
mod error;
mod get_history;
mod get_participants;
mod route_message;

pub use connect_participant::ConnectParticipantUseCase;
pub use disconnect_participant::DisconnectParticipantUseCase;
pub use error::ConnectError;
pub use get_history::GetHistoryUseCase;
pub use get_participants::GetParticipantsUseCase;
pub use route_message::{DropReason, RouteMessageUseCase, RouteOutcome};
