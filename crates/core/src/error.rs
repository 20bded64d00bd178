use thiserror::Error;

use crate::gate::RouteError;
use crate::model::{
    CourseError, EnrollmentError, MaterialError, ParseIdError, ProgressError, UserError,
};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Id(#[from] ParseIdError),
    #[error(transparent)]
    Course(#[from] CourseError),
    #[error(transparent)]
    Progress(#[from] ProgressError),
    #[error(transparent)]
    Enrollment(#[from] EnrollmentError),
    #[error(transparent)]
    Material(#[from] MaterialError),
    #[error(transparent)]
    User(#[from] UserError),
    #[error(transparent)]
    Route(#[from] RouteError),
}
