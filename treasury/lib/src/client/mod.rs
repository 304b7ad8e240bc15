//! The API client and its resource accessors.

mod executor;

pub use executor::{
    ApiClient, ApiClientBuilder, ENV_API_KEY, ENV_BASE_URL, ENV_ORGANIZATION_ID, ENV_WEBHOOK_KEY,
    default_http_client,
};

use crate::resources::{
    DocumentService, ExpectedPaymentService, ExternalAccountService,
    IncomingPaymentDetailService, LedgerTransactionService, PaymentFlowService,
    PaymentOrderService, ReturnService,
};

impl ApiClient {
    /// Payment orders and their reversals.
    pub fn payment_orders(&self) -> PaymentOrderService<'_> {
        PaymentOrderService::new(self)
    }

    /// Expected payments.
    pub fn expected_payments(&self) -> ExpectedPaymentService<'_> {
        ExpectedPaymentService::new(self)
    }

    /// External accounts.
    pub fn external_accounts(&self) -> ExternalAccountService<'_> {
        ExternalAccountService::new(self)
    }

    /// Documents.
    pub fn documents(&self) -> DocumentService<'_> {
        DocumentService::new(self)
    }

    /// Ledger transactions and their versions.
    pub fn ledger_transactions(&self) -> LedgerTransactionService<'_> {
        LedgerTransactionService::new(self)
    }

    /// Returns.
    pub fn returns(&self) -> ReturnService<'_> {
        ReturnService::new(self)
    }

    /// Incoming payment details, including sandbox simulation.
    pub fn incoming_payment_details(&self) -> IncomingPaymentDetailService<'_> {
        IncomingPaymentDetailService::new(self)
    }

    /// Payment flows.
    pub fn payment_flows(&self) -> PaymentFlowService<'_> {
        PaymentFlowService::new(self)
    }
}
