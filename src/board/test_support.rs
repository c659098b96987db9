//! In-memory Projects V2 board used by unit and behavioural tests.
//!
//! [`InMemoryBoard`] answers the same GraphQL documents the board API sends,
//! keeping boards, fields, items, and links in memory. Failures can be
//! injected per content id, per field, or per operation.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::github::error::BoardError;
use crate::github::gateway::{GraphQlGateway, GraphQlRequest};

use super::models::OwnerKind;
use super::queries;

/// Default number of nodes returned per connection page.
const DEFAULT_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    FindBoards(OwnerKind),
    OwnerId(OwnerKind),
    CreateBoard,
    SetVisibility,
    ListFields,
    CreateField,
    ListItems,
    AddItem,
    DeleteItem,
    UpdateItemField,
    RepositoryId,
    LinkRepository,
}

impl Route {
    fn for_query(query: &str) -> Option<Self> {
        let routes = [
            (queries::FIND_USER_BOARDS, Self::FindBoards(OwnerKind::User)),
            (
                queries::FIND_ORGANIZATION_BOARDS,
                Self::FindBoards(OwnerKind::Organization),
            ),
            (queries::USER_ID, Self::OwnerId(OwnerKind::User)),
            (
                queries::ORGANIZATION_ID,
                Self::OwnerId(OwnerKind::Organization),
            ),
            (queries::CREATE_BOARD, Self::CreateBoard),
            (queries::UPDATE_VISIBILITY, Self::SetVisibility),
            (queries::LIST_FIELDS, Self::ListFields),
            (queries::CREATE_FIELD, Self::CreateField),
            (queries::LIST_ITEMS, Self::ListItems),
            (queries::ADD_ITEM, Self::AddItem),
            (queries::DELETE_ITEM, Self::DeleteItem),
            (queries::UPDATE_ITEM_FIELD, Self::UpdateItemField),
            (queries::REPOSITORY_ID, Self::RepositoryId),
            (queries::LINK_REPOSITORY, Self::LinkRepository),
        ];
        routes
            .into_iter()
            .find(|(document, _)| *document == query)
            .map(|(_, route)| route)
    }
}

#[derive(Debug, Clone)]
struct FakeOption {
    id: String,
    name: String,
}

#[derive(Debug, Clone)]
struct FakeField {
    id: String,
    name: String,
    data_type: String,
    options: Vec<FakeOption>,
}

#[derive(Debug, Clone)]
struct FakeItem {
    id: String,
    content: Option<(String, String)>,
    draft: Option<String>,
    values: BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
struct FakeBoard {
    id: String,
    number: u64,
    title: String,
    url: String,
    owner: String,
    public: bool,
    fields: Vec<FakeField>,
    items: Vec<FakeItem>,
    links: BTreeSet<String>,
}

impl FakeBoard {
    fn node(&self) -> Value {
        json!({
            "id": self.id,
            "number": self.number,
            "title": self.title,
            "url": self.url,
            "public": self.public,
        })
    }

    fn field_by_id(&self, id: &str) -> Option<&FakeField> {
        self.fields.iter().find(|field| field.id == id)
    }
}

#[derive(Debug, Default)]
struct State {
    owners: BTreeMap<String, (String, OwnerKind)>,
    repositories: BTreeMap<String, String>,
    boards: Vec<FakeBoard>,
    page_size: usize,
    next_id: u64,
    failing_adds: BTreeSet<String>,
    failing_deletes: BTreeSet<String>,
    failing_field_updates: BTreeSet<String>,
    failing_operations: BTreeMap<String, BoardError>,
    calls: Vec<String>,
}

impl State {
    fn mint(&mut self, prefix: &str) -> String {
        self.next_id = self.next_id.saturating_add(1);
        format!("{prefix}_{}", self.next_id)
    }

    fn board(&self, id: &str) -> Result<&FakeBoard, BoardError> {
        self.boards
            .iter()
            .find(|board| board.id == id)
            .ok_or_else(|| not_found("ProjectV2", id))
    }

    fn board_mut(&mut self, id: &str) -> Result<&mut FakeBoard, BoardError> {
        self.boards
            .iter_mut()
            .find(|board| board.id == id)
            .ok_or_else(|| not_found("ProjectV2", id))
    }

    fn board_titled(&self, title: &str) -> Option<&FakeBoard> {
        self.boards.iter().find(|board| board.title == title)
    }

    fn board_titled_mut(&mut self, title: &str) -> Option<&mut FakeBoard> {
        self.boards.iter_mut().find(|board| board.title == title)
    }
}

/// A fake GitHub account with Projects V2 boards.
///
/// # Example
///
/// ```
/// use boardsync::board::test_support::InMemoryBoard;
///
/// let github = InMemoryBoard::new()
///     .with_user("octocat")
///     .with_board("octocat", "Enhancements", false)
///     .with_item("Enhancements", "I_1", "Add widgets");
/// assert_eq!(github.item_contents("Enhancements"), vec!["I_1".to_owned()]);
/// ```
#[derive(Debug)]
pub struct InMemoryBoard {
    state: Mutex<State>,
}

impl Default for InMemoryBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryBoard {
    /// Creates an empty fake with no accounts.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                page_size: DEFAULT_PAGE_SIZE,
                ..State::default()
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_state(self, change: impl FnOnce(&mut State)) -> Self {
        change(&mut self.state());
        self
    }

    /// Registers a user account.
    #[must_use]
    pub fn with_user(self, login: &str) -> Self {
        self.with_owner(login, OwnerKind::User)
    }

    /// Registers an organisation account.
    #[must_use]
    pub fn with_organization(self, login: &str) -> Self {
        self.with_owner(login, OwnerKind::Organization)
    }

    fn with_owner(self, login: &str, kind: OwnerKind) -> Self {
        self.with_state(|state| {
            let id = state.mint("O");
            state.owners.insert(login.to_owned(), (id, kind));
        })
    }

    /// Registers a repository that boards can be linked to.
    #[must_use]
    pub fn with_repository(self, slug: &str) -> Self {
        self.with_state(|state| {
            let id = state.mint("R");
            state.repositories.insert(slug.to_owned(), id);
        })
    }

    /// Adds an existing board owned by `owner`.
    #[must_use]
    pub fn with_board(self, owner: &str, title: &str, public: bool) -> Self {
        self.with_state(|state| {
            let board = new_board(state, owner, title, public);
            state.boards.push(board);
        })
    }

    /// Adds an existing single-select field to the board titled `board`.
    #[must_use]
    pub fn with_select_field(self, board: &str, name: &str, options: &[&str]) -> Self {
        self.with_state(|state| {
            let field = new_field(state, name, "SINGLE_SELECT", options.iter().copied());
            if let Some(target) = state.board_titled_mut(board) {
                target.fields.push(field);
            }
        })
    }

    /// Adds an existing text field to the board titled `board`.
    #[must_use]
    pub fn with_text_field(self, board: &str, name: &str) -> Self {
        self.with_typed_field(board, name, "TEXT")
    }

    /// Adds an existing option-less field of GraphQL type `data_type`.
    #[must_use]
    pub fn with_typed_field(self, board: &str, name: &str, data_type: &str) -> Self {
        self.with_state(|state| {
            let field = new_field(state, name, data_type, std::iter::empty());
            if let Some(target) = state.board_titled_mut(board) {
                target.fields.push(field);
            }
        })
    }

    /// Puts `content_id` on the board titled `board`.
    #[must_use]
    pub fn with_item(self, board: &str, content_id: &str, title: &str) -> Self {
        self.with_state(|state| {
            let id = state.mint("PVTI");
            if let Some(target) = state.board_titled_mut(board) {
                target.items.push(FakeItem {
                    id,
                    content: Some((content_id.to_owned(), title.to_owned())),
                    draft: None,
                    values: BTreeMap::new(),
                });
            }
        })
    }

    /// Puts an item whose content the token cannot see on the board.
    #[must_use]
    pub fn with_redacted_item(self, board: &str) -> Self {
        self.with_state(|state| {
            let id = state.mint("PVTI");
            if let Some(target) = state.board_titled_mut(board) {
                target.items.push(FakeItem {
                    id,
                    content: None,
                    draft: None,
                    values: BTreeMap::new(),
                });
            }
        })
    }

    /// Puts a draft note titled `title` on the board.
    #[must_use]
    pub fn with_draft_item(self, board: &str, title: &str) -> Self {
        self.with_state(|state| {
            let id = state.mint("PVTI");
            if let Some(target) = state.board_titled_mut(board) {
                target.items.push(FakeItem {
                    id,
                    content: None,
                    draft: Some(title.to_owned()),
                    values: BTreeMap::new(),
                });
            }
        })
    }

    /// Sets how many nodes each connection page carries.
    #[must_use]
    pub fn with_page_size(self, page_size: usize) -> Self {
        self.with_state(|state| state.page_size = page_size.max(1))
    }

    /// Makes adding `content_id` fail.
    #[must_use]
    pub fn failing_add(self, content_id: &str) -> Self {
        self.with_state(|state| {
            state.failing_adds.insert(content_id.to_owned());
        })
    }

    /// Makes deleting the item carrying `content_id` fail.
    #[must_use]
    pub fn failing_delete(self, content_id: &str) -> Self {
        self.with_state(|state| {
            state.failing_deletes.insert(content_id.to_owned());
        })
    }

    /// Makes setting values on the field named `field` fail.
    #[must_use]
    pub fn failing_field_update(self, field: &str) -> Self {
        self.with_state(|state| {
            state.failing_field_updates.insert(field.to_owned());
        })
    }

    /// Makes every request for `operation` fail with `error`.
    #[must_use]
    pub fn failing_operation(self, operation: &str, error: BoardError) -> Self {
        self.with_state(|state| {
            state.failing_operations.insert(operation.to_owned(), error);
        })
    }

    /// Makes every request for `operation` fail as rate limited.
    #[must_use]
    pub fn rate_limited(self, operation: &str, retry_after: Option<Duration>) -> Self {
        self.failing_operation(
            operation,
            BoardError::RateLimited {
                retry_after,
                message: "API rate limit exceeded".to_owned(),
            },
        )
    }

    /// Clears every injected failure.
    pub fn clear_failures(&self) {
        let mut state = self.state();
        state.failing_adds.clear();
        state.failing_deletes.clear();
        state.failing_field_updates.clear();
        state.failing_operations.clear();
    }

    /// Content ids on the board titled `board`, in board order.
    #[must_use]
    pub fn item_contents(&self, board: &str) -> Vec<String> {
        self.state()
            .board_titled(board)
            .map(|target| {
                target
                    .items
                    .iter()
                    .filter_map(|item| item.content.as_ref().map(|(id, _)| id.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of items, including redacted ones, on the board titled `board`.
    #[must_use]
    pub fn item_count(&self, board: &str) -> usize {
        self.state()
            .board_titled(board)
            .map_or(0, |target| target.items.len())
    }

    /// Field names on the board titled `board`, in creation order.
    #[must_use]
    pub fn field_names(&self, board: &str) -> Vec<String> {
        self.state()
            .board_titled(board)
            .map(|target| target.fields.iter().map(|field| field.name.clone()).collect())
            .unwrap_or_default()
    }

    /// Option names of `field` on the board titled `board`.
    #[must_use]
    pub fn option_names(&self, board: &str, field: &str) -> Vec<String> {
        self.state()
            .board_titled(board)
            .and_then(|target| target.fields.iter().find(|candidate| candidate.name == field))
            .map(|found| found.options.iter().map(|option| option.name.clone()).collect())
            .unwrap_or_default()
    }

    /// Display value of `field` on the item carrying `content_id`.
    ///
    /// Single-select values are reported by option name.
    #[must_use]
    pub fn field_value(&self, board: &str, content_id: &str, field: &str) -> Option<String> {
        let state = self.state();
        let target = state.board_titled(board)?;
        let definition = target.fields.iter().find(|candidate| candidate.name == field)?;
        let item = target.items.iter().find(|item| {
            item.content
                .as_ref()
                .is_some_and(|(id, _)| id == content_id)
        })?;
        let raw = item.values.get(&definition.id)?;
        let display = definition
            .options
            .iter()
            .find(|option| option.id == *raw)
            .map_or_else(|| raw.clone(), |option| option.name.clone());
        Some(display)
    }

    /// Whether the board titled `board` exists and is public.
    #[must_use]
    pub fn is_public(&self, board: &str) -> Option<bool> {
        self.state().board_titled(board).map(|target| target.public)
    }

    /// Number of boards titled `board`.
    #[must_use]
    pub fn boards_titled(&self, board: &str) -> usize {
        self.state()
            .boards
            .iter()
            .filter(|target| target.title == board)
            .count()
    }

    /// Repository slugs linked to the board titled `board`.
    #[must_use]
    pub fn linked_repositories(&self, board: &str) -> Vec<String> {
        self.state()
            .board_titled(board)
            .map(|target| target.links.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of requests received for `operation`.
    #[must_use]
    pub fn call_count(&self, operation: &str) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|call| call.as_str() == operation)
            .count()
    }

    fn dispatch(state: &mut State, route: Route, variables: &Value) -> Result<Value, BoardError> {
        match route {
            Route::FindBoards(kind) => find_boards(state, kind, variables),
            Route::OwnerId(kind) => owner_id(state, kind, variables),
            Route::CreateBoard => create_board(state, variables),
            Route::SetVisibility => set_visibility(state, variables),
            Route::ListFields => list_fields(state, variables),
            Route::CreateField => create_field(state, variables),
            Route::ListItems => list_items(state, variables),
            Route::AddItem => add_item(state, variables),
            Route::DeleteItem => delete_item(state, variables),
            Route::UpdateItemField => update_item_field(state, variables),
            Route::RepositoryId => repository_id(state, variables),
            Route::LinkRepository => link_repository(state, variables),
        }
    }
}

#[async_trait]
impl GraphQlGateway for InMemoryBoard {
    async fn execute(&self, request: &GraphQlRequest) -> Result<Value, BoardError> {
        let mut state = self.state();
        state.calls.push(request.operation.to_owned());

        if let Some(error) = state.failing_operations.get(request.operation) {
            return Err(error.clone());
        }

        let route = Route::for_query(request.query).ok_or_else(|| BoardError::GraphQl {
            message: format!("unsupported document for {}", request.operation),
        })?;
        Self::dispatch(&mut state, route, &request.variables)
    }
}

fn not_found(kind: &str, id: &str) -> BoardError {
    BoardError::GraphQl {
        message: format!("Could not resolve to a {kind} with the id or login of '{id}'."),
    }
}

fn text<'value>(variables: &'value Value, name: &str) -> Result<&'value str, BoardError> {
    variables
        .get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| BoardError::GraphQl {
            message: format!("Variable ${name} of type String! was provided invalid value"),
        })
}

fn new_board(state: &mut State, owner: &str, title: &str, public: bool) -> FakeBoard {
    let id = state.mint("PVT");
    let number = state.next_id;
    FakeBoard {
        id,
        number,
        title: title.to_owned(),
        url: format!("https://github.com/users/{owner}/projects/{number}"),
        owner: owner.to_owned(),
        public,
        fields: Vec::new(),
        items: Vec::new(),
        links: BTreeSet::new(),
    }
}

fn new_field<'name>(
    state: &mut State,
    name: &str,
    data_type: &str,
    options: impl Iterator<Item = &'name str>,
) -> FakeField {
    let id = state.mint("PVTSSF");
    let fake_options = options
        .map(|option| FakeOption {
            id: state.mint("OPT"),
            name: option.to_owned(),
        })
        .collect();
    FakeField {
        id,
        name: name.to_owned(),
        data_type: data_type.to_owned(),
        options: fake_options,
    }
}

fn page<T>(nodes: &[T], cursor: Option<&str>, page_size: usize, render: impl Fn(&T) -> Value) -> Value {
    let start = cursor
        .and_then(|raw| raw.parse::<usize>().ok())
        .unwrap_or(0);
    let end = start.saturating_add(page_size);
    let rendered: Vec<Value> = nodes.iter().skip(start).take(page_size).map(render).collect();
    let has_next_page = end < nodes.len();
    json!({
        "nodes": rendered,
        "pageInfo": {
            "hasNextPage": has_next_page,
            "endCursor": has_next_page.then(|| end.to_string()),
        }
    })
}

fn find_boards(state: &State, kind: OwnerKind, variables: &Value) -> Result<Value, BoardError> {
    let login = text(variables, "owner")?;
    match state.owners.get(login) {
        Some((_, owner_kind)) if *owner_kind == kind => {}
        _ => return Err(not_found(kind_label(kind), login)),
    }

    let owned: Vec<&FakeBoard> = state
        .boards
        .iter()
        .filter(|board| board.owner == login)
        .collect();
    let cursor = variables.get("cursor").and_then(Value::as_str);
    let connection = page(&owned, cursor, state.page_size, |board| board.node());
    Ok(json!({ kind.as_str(): { "projectsV2": connection } }))
}

const fn kind_label(kind: OwnerKind) -> &'static str {
    match kind {
        OwnerKind::User => "User",
        OwnerKind::Organization => "Organization",
    }
}

fn owner_id(state: &State, kind: OwnerKind, variables: &Value) -> Result<Value, BoardError> {
    let login = text(variables, "login")?;
    match state.owners.get(login) {
        Some((id, owner_kind)) if *owner_kind == kind => Ok(json!({ kind.as_str(): { "id": id } })),
        _ => Err(not_found(kind_label(kind), login)),
    }
}

fn create_board(state: &mut State, variables: &Value) -> Result<Value, BoardError> {
    let owner_id = text(variables, "ownerId")?;
    let title = text(variables, "title")?;
    let login = state
        .owners
        .iter()
        .find(|(_, (id, _))| id == owner_id)
        .map(|(login, _)| login.clone())
        .ok_or_else(|| not_found("Owner", owner_id))?;

    let board = new_board(state, &login, title, false);
    let node = board.node();
    state.boards.push(board);
    Ok(json!({ "createProjectV2": { "projectV2": node } }))
}

fn set_visibility(state: &mut State, variables: &Value) -> Result<Value, BoardError> {
    let board_id = text(variables, "projectId")?;
    let public = variables
        .get("public")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let board = state.board_mut(board_id)?;
    board.public = public;
    Ok(json!({ "updateProjectV2": { "projectV2": { "id": board_id, "public": public } } }))
}

fn render_field(field: &FakeField) -> Value {
    if field.options.is_empty() {
        json!({ "id": field.id, "name": field.name, "dataType": field.data_type })
    } else {
        let options: Vec<Value> = field
            .options
            .iter()
            .map(|option| json!({ "id": option.id, "name": option.name }))
            .collect();
        json!({
            "id": field.id,
            "name": field.name,
            "dataType": field.data_type,
            "options": options,
        })
    }
}

fn list_fields(state: &State, variables: &Value) -> Result<Value, BoardError> {
    let board = state.board(text(variables, "projectId")?)?;
    let cursor = variables.get("cursor").and_then(Value::as_str);
    let connection = page(&board.fields, cursor, state.page_size, render_field);
    Ok(json!({ "node": { "fields": connection } }))
}

fn create_field(state: &mut State, variables: &Value) -> Result<Value, BoardError> {
    let input = variables.get("input").unwrap_or(&Value::Null);
    let board_id = text(input, "projectId")?.to_owned();
    let name = text(input, "name")?.to_owned();
    let data_type = text(input, "dataType")?.to_owned();
    let options: Vec<String> = input
        .get("singleSelectOptions")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| entry.get("name").and_then(Value::as_str))
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default();

    if state
        .board(&board_id)?
        .fields
        .iter()
        .any(|field| field.name == name)
    {
        return Err(BoardError::GraphQl {
            message: format!("Name {name} has already been taken"),
        });
    }

    let field = new_field(state, &name, &data_type, options.iter().map(String::as_str));
    let rendered = render_field(&field);
    state.board_mut(&board_id)?.fields.push(field);
    Ok(json!({ "createProjectV2Field": { "projectV2Field": rendered } }))
}

fn render_item(item: &FakeItem) -> Value {
    match (&item.content, &item.draft) {
        (Some((id, title)), _) => json!({
            "id": item.id,
            "content": { "__typename": "Issue", "id": id, "title": title }
        }),
        (None, Some(title)) => json!({
            "id": item.id,
            "content": { "__typename": "DraftIssue", "title": title }
        }),
        (None, None) => json!({ "id": item.id, "content": null }),
    }
}

fn list_items(state: &State, variables: &Value) -> Result<Value, BoardError> {
    let board = state.board(text(variables, "projectId")?)?;
    let cursor = variables.get("cursor").and_then(Value::as_str);
    let connection = page(&board.items, cursor, state.page_size, render_item);
    Ok(json!({ "node": { "items": connection } }))
}

fn add_item(state: &mut State, variables: &Value) -> Result<Value, BoardError> {
    let board_id = text(variables, "projectId")?.to_owned();
    let content_id = text(variables, "contentId")?.to_owned();
    if state.failing_adds.contains(&content_id) {
        return Err(BoardError::GraphQl {
            message: format!("Could not add content {content_id}"),
        });
    }

    let existing = state.board(&board_id)?.items.iter().find_map(|item| {
        item.content
            .as_ref()
            .filter(|(id, _)| *id == content_id)
            .map(|_| item.id.clone())
    });
    let item_id = match existing {
        Some(id) => id,
        None => {
            let id = state.mint("PVTI");
            state.board_mut(&board_id)?.items.push(FakeItem {
                id: id.clone(),
                content: Some((content_id.clone(), content_id.clone())),
                draft: None,
                values: BTreeMap::new(),
            });
            id
        }
    };
    Ok(json!({ "addProjectV2ItemById": { "item": { "id": item_id } } }))
}

fn delete_item(state: &mut State, variables: &Value) -> Result<Value, BoardError> {
    let board_id = text(variables, "projectId")?.to_owned();
    let item_id = text(variables, "itemId")?.to_owned();
    let failing = state.failing_deletes.clone();
    let board = state.board_mut(&board_id)?;
    let position = board
        .items
        .iter()
        .position(|item| item.id == item_id)
        .ok_or_else(|| not_found("ProjectV2Item", &item_id))?;
    let blocked = board.items.get(position).is_some_and(|item| {
        item.content
            .as_ref()
            .is_some_and(|(content, _)| failing.contains(content))
    });
    if blocked {
        return Err(BoardError::Api {
            message: format!("could not delete {item_id}"),
        });
    }
    board.items.remove(position);
    Ok(json!({ "deleteProjectV2Item": { "deletedItemId": item_id } }))
}

fn update_item_field(state: &mut State, variables: &Value) -> Result<Value, BoardError> {
    let board_id = text(variables, "projectId")?.to_owned();
    let item_id = text(variables, "itemId")?.to_owned();
    let field_id = text(variables, "fieldId")?.to_owned();
    let value = variables.get("value").unwrap_or(&Value::Null);

    let board = state.board(&board_id)?;
    let field = board
        .field_by_id(&field_id)
        .ok_or_else(|| not_found("ProjectV2Field", &field_id))?;
    if state.failing_field_updates.contains(&field.name) {
        return Err(BoardError::GraphQl {
            message: format!("Could not update field {}", field.name),
        });
    }

    let stored = match value.get("singleSelectOptionId").and_then(Value::as_str) {
        Some(option) if !field.options.iter().any(|candidate| candidate.id == option) => {
            return Err(not_found("ProjectV2SingleSelectFieldOption", option));
        }
        Some(option) => option.to_owned(),
        None => value
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned(),
    };

    let item = state
        .board_mut(&board_id)?
        .items
        .iter_mut()
        .find(|candidate| candidate.id == item_id)
        .ok_or_else(|| not_found("ProjectV2Item", &item_id))?;
    item.values.insert(field_id, stored);
    Ok(json!({ "updateProjectV2ItemFieldValue": { "projectV2Item": { "id": item_id } } }))
}

fn repository_id(state: &State, variables: &Value) -> Result<Value, BoardError> {
    let slug = format!("{}/{}", text(variables, "owner")?, text(variables, "name")?);
    state
        .repositories
        .get(&slug)
        .map(|id| json!({ "repository": { "id": id } }))
        .ok_or_else(|| not_found("Repository", &slug))
}

fn link_repository(state: &mut State, variables: &Value) -> Result<Value, BoardError> {
    let board_id = text(variables, "projectId")?.to_owned();
    let repository_id = text(variables, "repositoryId")?.to_owned();
    let slug = state
        .repositories
        .iter()
        .find(|(_, id)| **id == repository_id)
        .map(|(slug, _)| slug.clone())
        .ok_or_else(|| not_found("Repository", &repository_id))?;

    let board = state.board_mut(&board_id)?;
    if !board.links.insert(slug) {
        return Err(BoardError::GraphQl {
            message: "Project is already linked to this repository".to_owned(),
        });
    }
    Ok(json!({ "linkProjectV2ToRepository": { "repository": { "id": repository_id } } }))
}
