mod payment_gateway_database;

pub use payment_gateway_database::PaymentGatewayDatabase;
