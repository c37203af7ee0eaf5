//! Sidebar entries per role and the board behind each work view.

use shared::{domain::UserRole, protocol::ViewId};
use sor_api::views::{self, BoardKind};

pub fn sidebar_views(role: UserRole) -> Vec<ViewId> {
    let mut items = vec![ViewId::Dashboard, ViewId::Requests];
    items.extend(views::boards_for_role(role).into_iter().map(board_view));
    items.push(ViewId::Users);
    items.push(ViewId::Settings);
    items
}

fn board_view(kind: BoardKind) -> ViewId {
    match kind {
        BoardKind::Sourcing => ViewId::Sourcing,
        BoardKind::Inventory => ViewId::Inventory,
        BoardKind::Finance => ViewId::Finance,
    }
}

pub fn board_for(view: ViewId) -> Option<BoardKind> {
    match view {
        ViewId::Sourcing => Some(BoardKind::Sourcing),
        ViewId::Inventory => Some(BoardKind::Inventory),
        ViewId::Finance => Some(BoardKind::Finance),
        _ => None,
    }
}
