//! Data models for EvtaarPro entities.
//!
//! This module contains all the data structures exchanged with the
//! `/api/v1` backend:
//!
//! - `Envelope`, `ErrorEnvelope`, `Pagination`, `Page`: response wrappers
//! - `User` and profile updates
//! - Auth requests and the token pair returned by login
//! - `Meeting`, payroll (`Employee`, `Attendance`, `PayrollRecord`),
//!   CRM (`Customer`, `Interaction`) and `Notification` records

pub mod auth;
pub mod crm;
pub mod envelope;
pub mod meeting;
pub mod notification;
pub mod payroll;
pub mod user;

pub use auth::{AuthTokens, LoginRequest, RegisterRequest, RegisteredUser};
pub use crm::{CreateInteractionRequest, Customer, CustomerQuery, CustomerRequest, Interaction};
pub use envelope::{Envelope, ErrorBody, ErrorEnvelope, ErrorField, Page, Pagination};
pub use meeting::{CreateMeetingRequest, JoinMeeting, Meeting, MeetingQuery, MeetingStatus};
pub use notification::{Notification, NotificationQuery, UnreadCount};
pub use payroll::{
    Attendance, AttendanceQuery, AttendanceStatus, CreateEmployeeRequest, Employee, EmployeeQuery,
    GeneratePayrollRequest, MarkAttendanceRequest, PaymentStatus, PayrollQuery, PayrollRecord,
};
pub use user::{UpdateProfileRequest, User, UserQuery};
