pub mod bluetooth;
pub mod gql_posts;
pub mod posts;
pub mod settings;
pub mod transfer;
