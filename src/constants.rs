//! Fixed vendor tables: replication keys, transient status codes, the
//! search-only deny-list, and the shared-filter sub-type maps.

/// Field names (lowercased) that identify a stream's replication key.
pub const REPLICATION_KEYS: &[&str] = &["lastmodifieddate", "lastmoddate"];

/// Vendor status codes that indicate a transient condition worth retrying.
pub const RETRYABLE_ERROR_CODES: &[&str] = &[
    "ACCT_TEMP_UNAVAILABLE",
    "BILL_PAY_STATUS_UNAVAILABLE",
    "BILLPAY_SRVC_UNAVAILBL",
    "PAYROLL_IN_PROCESS",
];

/// Record types present in the `GetAllRecordType` enumeration that cannot
/// actually be bulk-fetched. They are reachable through search instead.
pub const SEARCH_ONLY_TYPES: &[&str] = &["AccountingTransaction", "Item", "Transaction"];

/// Transaction sub-types that share the `TransactionSearchBasic` filter and
/// are disambiguated by the `recordType` contains-filter.
pub const TRANSACTION_SEARCH_TYPES: &[&str] = &[
    "AssemblyBuild",
    "AssemblyUnbuild",
    "BinTransfer",
    "BinWorksheet",
    "CashRefund",
    "CashSale",
    "Check",
    "CreditMemo",
    "CustomerDeposit",
    "CustomerPayment",
    "CustomerRefund",
    "CustomPurchase",
    "CustomSale",
    "Deposit",
    "DepositApplication",
    "Estimate",
    "ExpenseReport",
    "InterCompanyJournalEntry",
    "InventoryAdjustment",
    "InventoryCostRevaluation",
    "InventoryTransfer",
    "Invoice",
    "ItemFulfillment",
    "ItemReceipt",
    "JournalEntry",
    "Opportunity",
    "PaycheckJournal",
    "PurchaseOrder",
    "ReturnAuthorization",
    "SalesOrder",
    "StatisticalJournalEntry",
    "TransferOrder",
    "VendorBill",
    "VendorCredit",
    "VendorPayment",
    "VendorReturnAuthorization",
    "WorkOrder",
    "WorkOrderClose",
    "WorkOrderCompletion",
    "WorkOrderIssue",
];

/// Item sub-types that share the `ItemSearchBasic` filter.
pub const ITEM_SEARCH_TYPES: &[&str] = &["InventoryItem"];

/// Nested type name that triggers the polymorphic custom-field synthesis.
pub const CUSTOM_FIELD_LIST_TYPE: &str = "CustomFieldList";

/// Field that lists explicitly-null fields; metadata, never emitted.
pub const NULL_FIELD_LIST: &str = "nullFieldList";

/// Records per search page.
pub const DEFAULT_PAGE_SIZE: u32 = 500;

/// Attempt cap for the retryable-error backoff loop.
pub const MAX_RETRIES: u32 = 5;

/// Freshness window for the on-disk WSDL cache.
pub const WSDL_CACHE_TTL_SECS: u64 = 30 * 24 * 60 * 60;

/// Default bound on each network call.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;
