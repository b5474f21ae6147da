pub mod connection;
pub mod credentials;
pub mod page;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Connection(#[from] connection::ConnectionError),

    #[error(transparent)]
    Credentials(#[from] credentials::CredentialsError),

    #[error(transparent)]
    Page(#[from] page::PageError),
}
