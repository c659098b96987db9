//! Typed Projects V2 operations over a [`GraphQlGateway`].
//!
//! Each method issues exactly one GraphQL request, except the listing
//! methods, which page through the whole connection before returning.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::github::error::BoardError;
use crate::github::gateway::{GraphQlGateway, GraphQlRequest};
use crate::github::locator::RepositorySlug;
use crate::github::pagination::{Connection, CursorWalk};

use super::models::{
    BoardId, BoardItem, BoardOwner, BoardSchema, ContentId, FieldDataType, FieldDefinition,
    FieldId, FieldOption, FieldSpec, FieldValue, ItemId, OptionId, OwnerId, OwnerKind,
    ProjectBoard, RepositoryId, Visibility,
};
use super::queries;

/// Display colours assigned round-robin to new single-select options.
pub const OPTION_COLORS: [&str; 8] = [
    "GRAY", "BLUE", "GREEN", "YELLOW", "ORANGE", "RED", "PINK", "PURPLE",
];

/// Projects V2 operations bound to one gateway.
pub struct BoardApi<'gateway, Gateway>
where
    Gateway: GraphQlGateway + ?Sized,
{
    gateway: &'gateway Gateway,
}

impl<'gateway, Gateway> BoardApi<'gateway, Gateway>
where
    Gateway: GraphQlGateway + ?Sized,
{
    /// Creates an API facade over `gateway`.
    #[must_use]
    pub const fn new(gateway: &'gateway Gateway) -> Self {
        Self { gateway }
    }

    async fn run<T: DeserializeOwned>(&self, request: GraphQlRequest) -> Result<T, BoardError> {
        let data = self.gateway.execute(&request).await?;
        decode(request.operation, data)
    }

    /// Finds a board by exact title, looking under the user account first
    /// and then the organisation.
    ///
    /// GitHub answers a lookup under the wrong account kind with an error, so
    /// an error under one kind is tolerated when the other kind answers.
    ///
    /// # Errors
    ///
    /// Returns the organisation lookup error when both lookups fail, and any
    /// rate-limit error immediately.
    pub async fn find_board(
        &self,
        owner: &str,
        title: &str,
    ) -> Result<Option<ProjectBoard>, BoardError> {
        let user_lookup = self.find_board_as(owner, title, OwnerKind::User).await;
        let user_failure = match user_lookup {
            Ok(Some(board)) => return Ok(Some(board)),
            Ok(None) => None,
            Err(error) if error.is_rate_limited() => return Err(error),
            Err(error) => {
                tracing::debug!(owner, %error, "user board lookup failed");
                Some(error)
            }
        };

        match self
            .find_board_as(owner, title, OwnerKind::Organization)
            .await
        {
            Ok(found) => Ok(found),
            Err(error) if error.is_rate_limited() || user_failure.is_some() => Err(error),
            Err(error) => {
                tracing::debug!(owner, %error, "organisation board lookup failed");
                Ok(None)
            }
        }
    }

    async fn find_board_as(
        &self,
        owner: &str,
        title: &str,
        kind: OwnerKind,
    ) -> Result<Option<ProjectBoard>, BoardError> {
        let (operation, query) = match kind {
            OwnerKind::User => ("find user boards", queries::FIND_USER_BOARDS),
            OwnerKind::Organization => ("find organisation boards", queries::FIND_ORGANIZATION_BOARDS),
        };

        let mut walk = CursorWalk::new();
        loop {
            let request = GraphQlRequest::new(
                operation,
                query,
                json!({ "owner": owner, "cursor": walk.cursor() }),
            );
            let data: Value = self.run(request).await?;
            let Some(holder) = data.get(kind.as_str()).filter(|value| !value.is_null()) else {
                return Ok(None);
            };
            let boards: BoardsHolder = decode(operation, holder.clone())?;
            let (nodes, page) = boards.projects_v2.into_parts();

            if let Some(node) = nodes.into_iter().find(|node| node.title == title) {
                let owner_info = BoardOwner {
                    login: owner.to_owned(),
                    kind,
                };
                return Ok(Some(node.into_board(owner_info)));
            }

            if !walk.advance(operation, &page)? {
                return Ok(None);
            }
        }
    }

    /// Resolves the node identifier of a user or, failing that, an
    /// organisation login.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Api`] when neither account exists, or a
    /// rate-limit error as soon as one is seen.
    pub async fn resolve_owner_id(&self, login: &str) -> Result<(OwnerId, OwnerKind), BoardError> {
        for (kind, query) in [
            (OwnerKind::User, queries::USER_ID),
            (OwnerKind::Organization, queries::ORGANIZATION_ID),
        ] {
            let request = GraphQlRequest::new("resolve owner", query, json!({ "login": login }));
            match self.run::<Value>(request).await {
                Ok(data) => {
                    if let Some(id) = data
                        .get(kind.as_str())
                        .and_then(|account| account.get("id"))
                        .and_then(Value::as_str)
                        .filter(|id| !id.is_empty())
                    {
                        return Ok((OwnerId::new(id), kind));
                    }
                }
                Err(error) if error.is_rate_limited() => return Err(error),
                Err(error) => {
                    tracing::debug!(login, kind = kind.as_str(), %error, "owner lookup failed");
                }
            }
        }

        Err(BoardError::Api {
            message: format!("could not resolve node ID for {login:?}"),
        })
    }

    /// Creates a board titled `title` for `owner`.
    ///
    /// # Errors
    ///
    /// Propagates gateway failures and malformed responses.
    pub async fn create_board(
        &self,
        owner: BoardOwner,
        owner_id: &OwnerId,
        title: &str,
    ) -> Result<ProjectBoard, BoardError> {
        let request = GraphQlRequest::new(
            "create board",
            queries::CREATE_BOARD,
            json!({ "ownerId": owner_id.as_str(), "title": title }),
        );
        let response: CreateBoardResponse = self.run(request).await?;
        Ok(response.create_project_v2.project_v2.into_board(owner))
    }

    /// Sets board visibility and returns the visibility GitHub reports.
    ///
    /// # Errors
    ///
    /// Propagates gateway failures and malformed responses.
    pub async fn set_visibility(
        &self,
        board: &BoardId,
        visibility: Visibility,
    ) -> Result<Visibility, BoardError> {
        let request = GraphQlRequest::new(
            "set visibility",
            queries::UPDATE_VISIBILITY,
            json!({ "projectId": board.as_str(), "public": visibility.is_public() }),
        );
        let response: UpdateVisibilityResponse = self.run(request).await?;
        Ok(Visibility::from_public(
            response.update_project_v2.project_v2.public,
        ))
    }

    /// Reads the board's field definitions, 50 per page.
    ///
    /// Nodes without a name (field types the query does not select) are
    /// ignored.
    ///
    /// # Errors
    ///
    /// Propagates gateway failures on any page, and returns
    /// [`BoardError::Decode`] when the board node is missing.
    pub async fn list_fields(&self, board: &BoardId) -> Result<BoardSchema, BoardError> {
        let operation = "list fields";
        let mut definitions = Vec::new();
        let mut walk = CursorWalk::new();

        loop {
            let request = GraphQlRequest::new(
                operation,
                queries::LIST_FIELDS,
                json!({ "projectId": board.as_str(), "cursor": walk.cursor() }),
            );
            let response: NodeResponse<FieldsHolder> = self.run(request).await?;
            let holder = response.node.ok_or_else(|| missing_board(operation, board))?;
            let (nodes, page) = holder.fields.into_parts();
            definitions.extend(nodes.into_iter().filter_map(FieldNode::into_definition));

            if !walk.advance(operation, &page)? {
                break;
            }
        }

        tracing::debug!(
            board = %board,
            count = definitions.len(),
            pages = walk.pages(),
            "listed board fields"
        );
        Ok(BoardSchema::from_definitions(definitions))
    }

    /// Creates a text or single-select field from `spec`.
    ///
    /// Non-select specs are created as text fields. Options receive colours
    /// from [`OPTION_COLORS`] in order, wrapping around.
    ///
    /// # Errors
    ///
    /// Propagates gateway failures, and returns [`BoardError::Decode`] when
    /// the created field comes back without an identifier.
    pub async fn create_field(
        &self,
        board: &BoardId,
        spec: &FieldSpec,
    ) -> Result<FieldDefinition, BoardError> {
        let operation = "create field";
        let input = if spec.data_type == FieldDataType::SingleSelect {
            let options: Vec<Value> = spec
                .options
                .iter()
                .zip(OPTION_COLORS.iter().cycle())
                .map(|(name, color)| json!({ "name": name, "color": color, "description": "" }))
                .collect();
            json!({
                "projectId": board.as_str(),
                "name": spec.name,
                "dataType": FieldDataType::SingleSelect.as_api_str(),
                "singleSelectOptions": options,
            })
        } else {
            json!({
                "projectId": board.as_str(),
                "name": spec.name,
                "dataType": FieldDataType::Text.as_api_str(),
            })
        };

        let request =
            GraphQlRequest::new(operation, queries::CREATE_FIELD, json!({ "input": input }));
        let response: CreateFieldResponse = self.run(request).await?;
        response
            .create_project_v2_field
            .project_v2_field
            .into_definition()
            .ok_or_else(|| BoardError::Decode {
                operation: operation.to_owned(),
                message: format!("created field {:?} has no id or name", spec.name),
            })
    }

    /// Reads every item on the board, paging until the connection ends.
    ///
    /// # Errors
    ///
    /// Propagates gateway failures; a failure on any page fails the whole
    /// listing so callers never act on a partial membership view.
    pub async fn list_items(&self, board: &BoardId) -> Result<Vec<BoardItem>, BoardError> {
        let operation = "list items";
        let mut items = Vec::new();
        let mut walk = CursorWalk::new();

        loop {
            let request = GraphQlRequest::new(
                operation,
                queries::LIST_ITEMS,
                json!({ "projectId": board.as_str(), "cursor": walk.cursor() }),
            );
            let response: NodeResponse<ItemsHolder> = self.run(request).await?;
            let holder = response.node.ok_or_else(|| missing_board(operation, board))?;
            let (nodes, page) = holder.items.into_parts();
            items.extend(nodes.into_iter().map(ItemNode::into_item));

            if !walk.advance(operation, &page)? {
                break;
            }
        }

        tracing::debug!(board = %board, count = items.len(), pages = walk.pages(), "listed board items");
        Ok(items)
    }

    /// Adds `content` to the board and returns the new item identifier.
    ///
    /// # Errors
    ///
    /// Propagates gateway failures and malformed responses.
    pub async fn add_item(&self, board: &BoardId, content: &ContentId) -> Result<ItemId, BoardError> {
        let request = GraphQlRequest::new(
            "add item",
            queries::ADD_ITEM,
            json!({ "projectId": board.as_str(), "contentId": content.as_str() }),
        );
        let response: AddItemResponse = self.run(request).await?;
        Ok(response.add_project_v2_item_by_id.item.id)
    }

    /// Removes an item from the board.
    ///
    /// # Errors
    ///
    /// Propagates gateway failures.
    pub async fn delete_item(&self, board: &BoardId, item: &ItemId) -> Result<(), BoardError> {
        let request = GraphQlRequest::new(
            "delete item",
            queries::DELETE_ITEM,
            json!({ "projectId": board.as_str(), "itemId": item.as_str() }),
        );
        self.gateway.execute(&request).await.map(|_| ())
    }

    /// Sets one field value on one item.
    ///
    /// # Errors
    ///
    /// Propagates gateway failures.
    pub async fn update_item_field(
        &self,
        board: &BoardId,
        item: &ItemId,
        field: &FieldId,
        value: &FieldValue,
    ) -> Result<(), BoardError> {
        let request = GraphQlRequest::new(
            "update item field",
            queries::UPDATE_ITEM_FIELD,
            json!({
                "projectId": board.as_str(),
                "itemId": item.as_str(),
                "fieldId": field.as_str(),
                "value": value.to_graphql(),
            }),
        );
        self.gateway.execute(&request).await.map(|_| ())
    }

    /// Resolves a repository node identifier.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Api`] when the repository does not exist, and
    /// propagates gateway failures.
    pub async fn resolve_repository_id(
        &self,
        slug: &RepositorySlug,
    ) -> Result<RepositoryId, BoardError> {
        let request = GraphQlRequest::new(
            "resolve repository",
            queries::REPOSITORY_ID,
            json!({ "owner": slug.owner().as_str(), "name": slug.name().as_str() }),
        );
        let response: RepositoryResponse = self.run(request).await?;
        response
            .repository
            .map(|repository| repository.id)
            .filter(|id| !id.as_str().is_empty())
            .ok_or_else(|| BoardError::Api {
                message: format!("repository {slug} not found"),
            })
    }

    /// Links the board to a repository.
    ///
    /// # Errors
    ///
    /// Propagates gateway failures, including GitHub's "already linked"
    /// error, which callers may treat as success.
    pub async fn link_repository(
        &self,
        board: &BoardId,
        repository: &RepositoryId,
    ) -> Result<(), BoardError> {
        let request = GraphQlRequest::new(
            "link repository",
            queries::LINK_REPOSITORY,
            json!({ "projectId": board.as_str(), "repositoryId": repository.as_str() }),
        );
        self.gateway.execute(&request).await.map(|_| ())
    }
}

fn decode<T: DeserializeOwned>(operation: &str, data: Value) -> Result<T, BoardError> {
    serde_json::from_value(data).map_err(|error| BoardError::Decode {
        operation: operation.to_owned(),
        message: error.to_string(),
    })
}

fn missing_board(operation: &str, board: &BoardId) -> BoardError {
    BoardError::Decode {
        operation: operation.to_owned(),
        message: format!("board {board} not found"),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BoardsHolder {
    projects_v2: Connection<BoardNode>,
}

#[derive(Debug, Deserialize)]
struct BoardNode {
    id: BoardId,
    number: u64,
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    public: bool,
}

impl BoardNode {
    fn into_board(self, owner: BoardOwner) -> ProjectBoard {
        ProjectBoard {
            id: self.id,
            number: self.number,
            title: self.title,
            url: self.url,
            owner,
            visibility: Visibility::from_public(self.public),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateBoardResponse {
    create_project_v2: CreatedBoard,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedBoard {
    project_v2: BoardNode,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateVisibilityResponse {
    update_project_v2: UpdatedBoard,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdatedBoard {
    project_v2: VisibilityNode,
}

#[derive(Debug, Deserialize)]
struct VisibilityNode {
    #[serde(default)]
    public: bool,
}

#[derive(Debug, Deserialize)]
struct NodeResponse<T> {
    node: Option<T>,
}

#[derive(Debug, Deserialize)]
struct FieldsHolder {
    fields: Connection<FieldNode>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FieldNode {
    #[serde(default)]
    id: Option<FieldId>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    data_type: Option<FieldDataType>,
    #[serde(default)]
    options: Vec<OptionNode>,
}

impl FieldNode {
    fn into_definition(self) -> Option<FieldDefinition> {
        let id = self.id?;
        let name = self.name.filter(|name| !name.is_empty())?;
        let data_type = match self.data_type {
            Some(data_type) if self.options.is_empty() => data_type,
            None if self.options.is_empty() => FieldDataType::Text,
            _ => FieldDataType::SingleSelect,
        };
        let options = self
            .options
            .into_iter()
            .map(|option| FieldOption {
                id: option.id,
                name: option.name,
            })
            .collect();

        Some(FieldDefinition {
            id,
            name,
            data_type,
            options,
        })
    }
}

#[derive(Debug, Deserialize)]
struct OptionNode {
    id: OptionId,
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateFieldResponse {
    create_project_v2_field: CreatedField,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedField {
    project_v2_field: FieldNode,
}

#[derive(Debug, Deserialize)]
struct ItemsHolder {
    items: Connection<ItemNode>,
}

#[derive(Debug, Deserialize)]
struct ItemNode {
    id: ItemId,
    #[serde(default)]
    content: Option<ContentNode>,
}

#[derive(Debug, Default, Deserialize)]
struct ContentNode {
    #[serde(default, rename = "__typename")]
    typename: Option<String>,
    #[serde(default)]
    id: Option<ContentId>,
    #[serde(default)]
    title: Option<String>,
}

/// Content types whose identifier can be re-added to a board.
const TRACKED_CONTENT: [&str; 2] = ["Issue", "PullRequest"];

impl ContentNode {
    fn is_tracked(&self) -> bool {
        self.typename
            .as_deref()
            .is_some_and(|typename| TRACKED_CONTENT.contains(&typename))
    }
}

impl ItemNode {
    /// Drafts and untyped content carry no content id, so indexing and
    /// pruning never see them.
    fn into_item(self) -> BoardItem {
        let content = self.content.unwrap_or_default();
        let tracked = content.is_tracked();
        BoardItem {
            id: self.id,
            content_id: content
                .id
                .filter(|id| tracked && !id.as_str().is_empty()),
            title: content.title,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddItemResponse {
    add_project_v2_item_by_id: AddedItem,
}

#[derive(Debug, Deserialize)]
struct AddedItem {
    item: AddedItemNode,
}

#[derive(Debug, Deserialize)]
struct AddedItemNode {
    id: ItemId,
}

#[derive(Debug, Deserialize)]
struct RepositoryResponse {
    repository: Option<RepositoryNode>,
}

#[derive(Debug, Deserialize)]
struct RepositoryNode {
    id: RepositoryId,
}

#[cfg(test)]
#[path = "api_tests.rs"]
mod tests;
