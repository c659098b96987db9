//! GraphQL documents for the Projects V2 API.

pub(crate) const FIND_USER_BOARDS: &str = r"query($owner: String!, $cursor: String) {
  user(login: $owner) {
    projectsV2(first: 100, after: $cursor) {
      nodes { id number title url public }
      pageInfo { hasNextPage endCursor }
    }
  }
}";

pub(crate) const FIND_ORGANIZATION_BOARDS: &str = r"query($owner: String!, $cursor: String) {
  organization(login: $owner) {
    projectsV2(first: 100, after: $cursor) {
      nodes { id number title url public }
      pageInfo { hasNextPage endCursor }
    }
  }
}";

pub(crate) const USER_ID: &str = r"query($login: String!) { user(login: $login) { id } }";

pub(crate) const ORGANIZATION_ID: &str =
    r"query($login: String!) { organization(login: $login) { id } }";

pub(crate) const CREATE_BOARD: &str = r"mutation($ownerId: ID!, $title: String!) {
  createProjectV2(input: {ownerId: $ownerId, title: $title}) {
    projectV2 { id number title url public }
  }
}";

pub(crate) const UPDATE_VISIBILITY: &str = r"mutation($projectId: ID!, $public: Boolean!) {
  updateProjectV2(input: {projectId: $projectId, public: $public}) {
    projectV2 { id public }
  }
}";

pub(crate) const LIST_FIELDS: &str = r"query($projectId: ID!, $cursor: String) {
  node(id: $projectId) {
    ... on ProjectV2 {
      fields(first: 50, after: $cursor) {
        nodes {
          ... on ProjectV2SingleSelectField { id name dataType options { id name } }
          ... on ProjectV2FieldCommon { id name dataType }
        }
        pageInfo { hasNextPage endCursor }
      }
    }
  }
}";

pub(crate) const CREATE_FIELD: &str = r"mutation($input: CreateProjectV2FieldInput!) {
  createProjectV2Field(input: $input) {
    projectV2Field {
      ... on ProjectV2Field { id name dataType }
      ... on ProjectV2SingleSelectField { id name dataType options { id name } }
    }
  }
}";

pub(crate) const LIST_ITEMS: &str = r"query($projectId: ID!, $cursor: String) {
  node(id: $projectId) {
    ... on ProjectV2 {
      items(first: 100, after: $cursor) {
        nodes {
          id
          content {
            __typename
            ... on Issue { id title }
            ... on PullRequest { id title }
            ... on DraftIssue { title }
          }
        }
        pageInfo { hasNextPage endCursor }
      }
    }
  }
}";

pub(crate) const ADD_ITEM: &str = r"mutation($projectId: ID!, $contentId: ID!) {
  addProjectV2ItemById(input: {projectId: $projectId, contentId: $contentId}) {
    item { id }
  }
}";

pub(crate) const DELETE_ITEM: &str = r"mutation($projectId: ID!, $itemId: ID!) {
  deleteProjectV2Item(input: {projectId: $projectId, itemId: $itemId}) {
    deletedItemId
  }
}";

pub(crate) const UPDATE_ITEM_FIELD: &str =
    r"mutation($projectId: ID!, $itemId: ID!, $fieldId: ID!, $value: ProjectV2FieldValue!) {
  updateProjectV2ItemFieldValue(input: {
    projectId: $projectId
    itemId: $itemId
    fieldId: $fieldId
    value: $value
  }) {
    projectV2Item { id }
  }
}";

pub(crate) const REPOSITORY_ID: &str =
    r"query($owner: String!, $name: String!) { repository(owner: $owner, name: $name) { id } }";

pub(crate) const LINK_REPOSITORY: &str = r"mutation($projectId: ID!, $repositoryId: ID!) {
  linkProjectV2ToRepository(input: {projectId: $projectId, repositoryId: $repositoryId}) {
    repository { id }
  }
}";
