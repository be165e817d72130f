/// 业务错误码，随 `ApiResponse.code` 返回
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Success = 0,

    // 通用
    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1003,
    NotFound = 1004,
    Conflict = 1009,
    RateLimitExceeded = 1029,
    InternalServerError = 1500,

    // 认证
    AuthFailed = 2000,
    RegisterFailed = 2001,
    UserInactive = 2002,

    // 用户
    UserNotFound = 2100,
    UserAlreadyExists = 2101,
    UserNameInvalid = 2102,
    UserEmailInvalid = 2103,
    UserPasswordInvalid = 2104,
    UserUpdateFailed = 2105,
    UserDeleteFailed = 2106,
    CanNotDeleteCurrentUser = 2107,

    // 工作区
    WorkspaceNotFound = 3000,
    WorkspaceAlreadyExists = 3001,
    WorkspacePermissionDenied = 3002,
    WorkspaceNameInvalid = 3003,

    // 文件夹
    FolderNotFound = 3100,
    FolderAlreadyExists = 3101,
    FolderNotEmpty = 3102,
    FolderInvalidParent = 3103,
    FolderNameInvalid = 3104,

    // 文件
    FileNotFound = 4000,
    FileUploadFailed = 4001,
    FileTypeNotAllowed = 4002,
    FileSizeExceeded = 4003,
    MultifileUploadNotAllowed = 4004,
    FileBlobMissing = 4005,
    FileNameInvalid = 4006,
    LabelInvalid = 4007,

    // 审批
    ApprovalNotFound = 5000,
    ApprovalAlreadyPending = 5001,
    ApprovalVersionConflict = 5002,
    ApprovalInvalidTransition = 5003,
    ApprovalApproverInvalid = 5004,
    ApprovalPermissionDenied = 5005,

    // 通知
    NotificationNotFound = 6000,
}
