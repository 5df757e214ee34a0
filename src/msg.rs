#[derive(Clone, Debug)]
/// A message which is sent after an enrollment is created or deleted. Open
/// admin dashboards use it to refresh the table of the affected team.
pub struct Msg {
    pub team: String,
    pub inner: MsgContents,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MsgContents {
    EnrollmentCreated,
    EnrollmentDeleted,
}
