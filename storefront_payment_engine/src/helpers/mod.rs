mod payment_signature;
mod validation;

pub use payment_signature::{compute_payment_signature, signature_message, verify_payment_signature};
pub use validation::{
    validate_gateway_order_request,
    validate_new_order,
    validate_payment_confirmation,
    ValidationIssue,
    MAX_ITEM_PRICE,
    MAX_ITEM_QUANTITY,
    MAX_ORDER_TOTAL,
    MAX_RECEIPT_LEN,
};
