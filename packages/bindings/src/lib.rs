use napi::Result as NapiResult;
use napi_derive::napi;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Payment
// ---------------------------------------------------------------------------

#[napi]
pub fn compute_payment(input_json: String) -> NapiResult<String> {
    let terms: deal_desk_core::payment::LoanTerms =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = deal_desk_core::payment::compute_payment(&terms).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn payment_grid(input_json: String) -> NapiResult<String> {
    let input: deal_desk_core::payment::PaymentGridInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = deal_desk_core::payment::payment_grid(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn amortization_schedule(input_json: String) -> NapiResult<String> {
    let input: deal_desk_core::payment::ScheduleInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        deal_desk_core::payment::amortization_schedule(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Fees & desking
// ---------------------------------------------------------------------------

#[napi]
pub fn lookup_regional_fees(zip_code: String) -> NapiResult<String> {
    let table = deal_desk_core::fees::RegionalFeeTable::builtin();
    let fees = table.lookup(&zip_code).map_err(to_napi_error)?;
    serde_json::to_string(&fees).map_err(to_napi_error)
}

#[napi]
pub fn desk_deal(input_json: String) -> NapiResult<String> {
    let input: deal_desk_core::desking::DeskDealInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let table = deal_desk_core::fees::RegionalFeeTable::builtin();
    let output = deal_desk_core::desking::desk_deal(&input, &table).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Gross & credit
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_deal_gross(input_json: String) -> NapiResult<String> {
    let input: deal_desk_core::gross::GrossInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = deal_desk_core::gross::calculate_deal_gross(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn quote_lenders(input_json: String) -> NapiResult<String> {
    let input: deal_desk_core::credit::RateQuoteInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let lenders = deal_desk_core::credit::builtin_lenders();
    let output =
        deal_desk_core::credit::quote_lenders(&input, &lenders).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
