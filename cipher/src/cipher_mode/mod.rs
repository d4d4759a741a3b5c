//! # 以RSA为分组函数的链接模式
//!
//! 与NIST 800-38A中的CBC不同, 这里的分组大小是1个字节, 分组函数是RSA模幂运算,
//! 每个明文字节对应一个大整数密文, 密文序列的顺序不可改变.
//!
//! ## The Cipher Block Chaining Mode(CBC)
//!
//! 给定初始向量IV(由nonce充当, 每条消息都需要重新生成), 记$E$为公钥加密, $D$为私钥解密:
//!
//! $$
//! C_1 = E(P_1 \xor (IV \mod 256)); C_j = E(P_j \xor (C_{j-1} \mod 256)), j = 2...n
//!
//! P_1 = D(C_1) \xor (IV \mod 256); P_j = D(C_j) \xor (C_{j-1} \mod 256), j = 2...n
//! $$
//!
//! 解密时链接值取自密文而不是恢复出的明文, 所以篡改$C_i$只会影响$P_i$和$P_{i+1}$,
//! 当篡改后的$C_i$与原值模256同余时, 只有$P_i$受影响. <br>
//! 加密每个字节依赖前一个密文输出, 故Encrypt无法并行. <br>
//! <br>

mod cbc;
pub use cbc::{decrypt_message, encrypt_message, CBC};
