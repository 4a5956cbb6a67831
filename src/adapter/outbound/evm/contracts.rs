//! Minimal ABIs of the ERC-20 token and Uniswap-V2 style contracts.

use alloy_primitives::{Bytes, U256};
use alloy_sol_types::{sol, SolCall};

use crate::port::outbound::chain::{SwapCall, SwapMethod};

sol! {
    #[sol(rpc)]
    contract IERC20 {
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
    }
}

sol! {
    #[sol(rpc)]
    contract IUniswapV2Factory {
        function getPair(address tokenA, address tokenB) external view returns (address pair);
    }
}

sol! {
    #[sol(rpc)]
    contract IUniswapV2Pair {
        function token0() external view returns (address);
        function getReserves() external view returns (uint112 reserve0, uint112 reserve1, uint32 blockTimestampLast);
    }
}

sol! {
    contract IUniswapV2Router02 {
        function swapExactTokensForTokens(
            uint256 amountIn,
            uint256 amountOutMin,
            address[] calldata path,
            address to,
            uint256 deadline
        ) external returns (uint256[] memory amounts);

        function swapExactTokensForETH(
            uint256 amountIn,
            uint256 amountOutMin,
            address[] calldata path,
            address to,
            uint256 deadline
        ) external returns (uint256[] memory amounts);
    }
}

/// ABI-encoded router calldata for `call`.
#[must_use]
pub fn swap_calldata(call: &SwapCall) -> Bytes {
    let deadline = U256::from(call.deadline);
    let encoded = match call.method {
        SwapMethod::ExactTokensForTokens => IUniswapV2Router02::swapExactTokensForTokensCall {
            amountIn: call.amount_in,
            amountOutMin: call.amount_out_min,
            path: call.path.clone(),
            to: call.recipient,
            deadline,
        }
        .abi_encode(),
        SwapMethod::ExactTokensForEth => IUniswapV2Router02::swapExactTokensForETHCall {
            amountIn: call.amount_in,
            amountOutMin: call.amount_out_min,
            path: call.path.clone(),
            to: call.recipient,
            deadline,
        }
        .abi_encode(),
    };
    Bytes::from(encoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::Address;

    fn call(method: SwapMethod) -> SwapCall {
        SwapCall {
            method,
            amount_in: U256::from(1000u64),
            amount_out_min: U256::from(95u64),
            path: vec![Address::repeat_byte(0x11), Address::repeat_byte(0x22)],
            recipient: Address::repeat_byte(0x33),
            deadline: 1_700_001_200,
        }
    }

    #[test]
    fn calldata_selector_follows_swap_method() {
        let tokens = swap_calldata(&call(SwapMethod::ExactTokensForTokens));
        let eth = swap_calldata(&call(SwapMethod::ExactTokensForEth));

        assert_eq!(
            &tokens[..4],
            IUniswapV2Router02::swapExactTokensForTokensCall::SELECTOR.as_slice()
        );
        assert_eq!(
            &eth[..4],
            IUniswapV2Router02::swapExactTokensForETHCall::SELECTOR.as_slice()
        );
    }

    #[test]
    fn calldata_decodes_back_to_the_call_arguments() {
        let data = swap_calldata(&call(SwapMethod::ExactTokensForTokens));
        let decoded =
            IUniswapV2Router02::swapExactTokensForTokensCall::abi_decode(&data).unwrap();
        assert_eq!(decoded.amountIn, U256::from(1000u64));
        assert_eq!(decoded.amountOutMin, U256::from(95u64));
        assert_eq!(decoded.path.len(), 2);
        assert_eq!(decoded.to, Address::repeat_byte(0x33));
        assert_eq!(decoded.deadline, U256::from(1_700_001_200u64));
    }
}
