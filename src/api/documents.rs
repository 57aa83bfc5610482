pub(crate) const LIST_MESSAGES: &str = r#"query ListMessages($filter: ModelMessageFilterInput, $limit: Int, $nextToken: String) {
  listMessages(filter: $filter, limit: $limit, nextToken: $nextToken) {
    items {
      id
      owner
      message
      createdAt
      updatedAt
    }
    nextToken
  }
}"#;

pub(crate) const CREATE_MESSAGE: &str = r#"mutation CreateMessage($input: CreateMessageInput!, $condition: ModelMessageConditionInput) {
  createMessage(input: $input, condition: $condition) {
    id
    owner
    message
    createdAt
    updatedAt
  }
}"#;

pub(crate) const ON_CREATE_MESSAGE: &str = r#"subscription OnCreateMessage {
  onCreateMessage {
    id
    owner
    message
    createdAt
    updatedAt
  }
}"#;
