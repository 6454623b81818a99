pub mod dealer;
pub mod pub_router;
pub mod sub;

use crate::cli::RetryArgs;
use rzmq_pubrouter::RetryPolicy;

impl RetryArgs {
  pub fn policy(&self) -> RetryPolicy {
    RetryPolicy::retries(self.retries)
  }
}
