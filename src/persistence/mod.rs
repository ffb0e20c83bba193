//! Database layer: pool, migrations, and access for users, resources, positions, transactions.

mod pool;
mod positions;
mod resources;
mod transactions;
mod users;

pub use pool::create_pool_and_migrate;
pub use positions::{delete_position, list_positions, position_row_to_position, upsert_position, PositionRow};
pub use resources::{
    insert_resource_if_absent, list_resources, resource_row_to_resource, update_resource_price,
    ResourceRow,
};
pub use transactions::{insert_transaction, list_transactions, transaction_row_to_transaction};
pub use users::{
    get_user_by_id, get_user_by_username, insert_user, list_users, update_user_balance,
    user_row_to_user, UserRow,
};
