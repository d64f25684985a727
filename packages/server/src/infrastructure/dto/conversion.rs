//! Domain Model → DTO 変換

use linechat_shared::time::timestamp_to_rfc3339;

use crate::domain::ClientRecord;

use super::http::ParticipantDto;

impl From<&ClientRecord> for ParticipantDto {
    fn from(record: &ClientRecord) -> Self {
        Self {
            connection_id: record.id.value(),
            username: record.username.as_str().to_string(),
            connected_at: timestamp_to_rfc3339(record.connected_at.value()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ConnectionId, Timestamp, Username};

    #[test]
    fn test_client_record_to_participant_dto() {
        // テスト項目: ClientRecord が ParticipantDto に変換される
        // given (前提条件):
        let record = ClientRecord::new(
            ConnectionId::new(3),
            Username::new("alice").unwrap(),
            Timestamp::new(1672531200000),
        );

        // when (操作):
        let dto = ParticipantDto::from(&record);

        // then (期待する結果):
        assert_eq!(dto.connection_id, 3);
        assert_eq!(dto.username, "alice");
        assert_eq!(dto.connected_at, "2023-01-01T00:00:00+00:00");
    }
}
