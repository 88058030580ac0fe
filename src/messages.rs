//! Operator-facing text.
//!
//! Tills display these verbatim, so wording and the conditions that raise them
//! must stay stable. Log lines stay in English and never use this module.

use rust_decimal::Decimal;

// Checkout
pub const CUSTOMER_NAME_REQUIRED: &str = "يرجى إدخال اسم العميل.";
pub const CUSTOMER_NAME_CHARSET: &str = "اسم العميل يجب أن يحتوي على حروف عربية أو إنجليزية فقط.";
pub const CUSTOMER_NAME_LENGTH: &str = "اسم العميل يجب أن يكون بين 2 و 50 حرفًا.";
pub const PHONE_FORMAT: &str = "رقم الهاتف يجب أن يحتوي على أرقام فقط ويكون بين 10 و 15 رقمًا.";
pub const CART_EMPTY: &str = "يرجى إضافة عنصر واحد على الأقل إلى الطلب.";
pub const CART_DUPLICATE_LINE: &str = "لا يمكن إضافة نفس القهوة أكثر من مرة إلى الطلب.";
pub const QUANTITY_NEGATIVE: &str = "الكمية يجب أن تكون أكبر من أو تساوي صفر.";
pub const AMOUNT_PAID_INVALID: &str = "المبلغ المدفوع يجب أن يكون رقمًا صحيحًا أو عشريًا.";
pub const NOTES_TOO_LONG: &str = "الملاحظات لا يمكن أن تتجاوز 500 حرف.";
pub const ORDER_CREATED: &str = "تم إنشاء الطلب بنجاح!";
pub const TYPE_UNSPECIFIED: &str = "غير محدد";
pub const NO_NOTES: &str = "لا توجد ملاحظات متاحة";

pub fn stock_exceeded(available: Decimal) -> String {
    format!(
        "الكمية المطلوبة تتجاوز المخزون المتاح: {} كجم",
        fixed(available, 3)
    )
}

pub fn amount_paid_below_total(paid: Decimal, total: Decimal) -> String {
    format!(
        "المبلغ المدفوع ({}) أقل من الإجمالي ({}).",
        paid.normalize(),
        fixed(total, 2)
    )
}

// Order history and cancellation
pub const ORDER_ALREADY_CANCELLED: &str = "الطلب ملغى بالفعل.";
pub const ORDER_CANCELLED: &str = "تم إلغاء الطلب بنجاح.";
pub const CANCELLATION_DECLINED: &str = "لم يتم إلغاء الطلب.";
pub const CANCEL_REQUIRES_CONFIRMATION: &str =
    "لإلغاء الطلب استخدم أمر الإلغاء وأكد العملية (POST /orders/{id}/cancel?confirm=true).";
pub const ORDER_UPDATE_IN_PROGRESS: &str = "يتم تحديث هذا الطلب حاليًا. يرجى المحاولة مرة أخرى.";
pub const DATABASE_ERROR: &str = "خطأ في تحديث قاعدة البيانات.";
pub const ORDER_CHANGED_CONCURRENTLY: &str =
    "تم تعديل الطلب من جهاز آخر. يرجى تحديث البيانات والمحاولة مرة أخرى.";

pub fn order_status_updated(status_name: &str) -> String {
    format!("تم تحديث حالة الطلب بنجاح. الحالة: {}", status_name)
}

pub fn order_not_found(order_id: i32) -> String {
    format!("OrderID {} not found in database", order_id)
}

pub fn unknown_status(status_id: i32) -> String {
    format!("StatusID {} does not exist in OrderStatuses", status_id)
}

pub fn invalid_transition(from: &str, to: &str) -> String {
    format!("لا يمكن تغيير حالة الطلب من '{}' إلى '{}'.", from, to)
}

pub fn invalid_order_line(line_id: i32) -> String {
    format!(
        "بيانات تفاصيل الطلب غير صالحة: CoffeeInventory أو Quantity فارغ لـ OrderDetailID {}",
        line_id
    )
}

pub fn order_status_update_failed(detail: &str) -> String {
    format!("خطأ في تحديث حالة الطلب: {}", detail)
}

// Inventory
pub const COFFEE_NAME_REQUIRED: &str = "يرجى إدخال اسم القهوة.";
pub const COFFEE_NAME_CHARSET: &str =
    "اسم القهوة يجب أن يحتوي على حروف عربية أو لاتينية، أرقام، مسافات، واصلات، أو علامات تنصيص فقط.";
pub const COFFEE_TYPE_REQUIRED: &str = "يرجى تحديد نوع القهوة.";
pub const QUANTITY_INVALID: &str = "يرجى إدخال كمية صالحة (رقم إيجابي).";
pub const PRICE_INVALID: &str = "يرجى إدخال سعر صالح (رقم إيجابي).";
pub const COFFEE_NOT_FOUND: &str = "لم يتم العثور على القهوة المحددة في قاعدة البيانات.";
pub const COFFEE_ADDED: &str = "تمت إضافة القهوة إلى المخزون بنجاح.";
pub const COFFEE_UPDATED: &str = "تم تعديل القهوة بنجاح.";
pub const COFFEE_DELETED: &str = "تم حذف القهوة بنجاح.";
pub const DELETE_DECLINED: &str = "لم يتم الحذف.";
pub const SEARCH_REQUIRED: &str = "يرجى إدخال رقم أو اسم أو وصف للبحث.";
pub const SEARCH_INVALID: &str =
    "يرجى إدخال نص بحث صالح (حروف عربية أو لاتينية، أرقام، مسافات، أو واصلات فقط، بحد أقصى 100 حرف).";

pub fn coffee_name_too_long(max: usize) -> String {
    format!("اسم القهوة يجب ألا يتجاوز {} حرفًا.", max)
}

pub fn description_too_long(max: usize) -> String {
    format!("الوصف يجب ألا يتجاوز {} حرفًا.", max)
}

pub fn quantity_above_max(max: Decimal) -> String {
    format!("الكمية يجب ألا تتجاوز {} كجم.", max)
}

pub fn price_above_max(max: Decimal) -> String {
    format!("السعر يجب ألا يتجاوز {} لكل كجم.", max)
}

pub fn coffee_id_not_found(coffee_id: i32) -> String {
    format!("لم يتم العثور على قهوة بالرقم: {}", coffee_id)
}

pub fn no_search_match(query: &str) -> String {
    format!("لم يتم العثور على قهوة مطابقة لـ: {}", query)
}

// Coffee types
pub const TYPE_NAME_REQUIRED: &str = "يرجى إدخال اسم نوع القهوة.";
pub const TYPE_NAME_CHARSET: &str =
    "اسم نوع القهوة يجب أن يحتوي على حروف عربية أو لاتينية، أرقام، مسافات، واصلات، أو علامات تنصيص فقط.";
pub const TYPE_NOT_FOUND: &str = "لم يتم العثور على نوع القهوة المحدد في قاعدة البيانات.";
pub const TYPE_ADDED: &str = "تمت إضافة نوع القهوة بنجاح!";

pub fn type_name_too_long(max: usize) -> String {
    format!("اسم نوع القهوة يجب ألا يتجاوز {} حرفًا.", max)
}

pub fn type_already_exists(name: &str) -> String {
    format!("نوع القهوة '{}' موجود بالفعل. يرجى اختيار اسم آخر.", name)
}

pub fn type_in_use(name: &str) -> String {
    format!(
        "لا يمكن حذف نوع القهوة '{}' لأنه مستخدم في عناصر المخزون.",
        name
    )
}

pub fn type_deleted(name: &str) -> String {
    format!("تم حذف نوع القهوة '{}' بنجاح.", name)
}

/// Fixed-point rendering with exactly `dp` decimals, like `F2`/`F3` format strings.
pub fn fixed(value: Decimal, dp: u32) -> String {
    let mut rounded = value.round_dp(dp);
    rounded.rescale(dp);
    rounded.to_string()
}
